//! Merges competing plan entries into one decision

use super::{EntryFlags, ResolvedEntry, VersionRequest, BUNDLER};
use crate::log_emitter::LogEmitter;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Picks the highest-priority version opinion and ORs every entry's flags.
#[derive(Debug, Clone)]
pub struct PlanEntryResolver {
    emitter: LogEmitter,
}

impl PlanEntryResolver {
    pub fn new(emitter: LogEmitter) -> Self {
        Self { emitter }
    }

    /// Resolves `entries` into a single entry.
    ///
    /// The version comes from the highest-ranked entry that names one; equal
    /// ranks keep input order. Flags are the union over all entries, including
    /// those that lost the version contest or carried no version at all. An
    /// empty input yields no version and no flags. Entries naming a dependency
    /// other than `bundler` are skipped.
    pub fn resolve(&self, entries: &[VersionRequest]) -> ResolvedEntry {
        let name = BUNDLER.to_string();

        let entries: Vec<&VersionRequest> = entries
            .iter()
            .filter(|entry| {
                let matches = entry.name == name;
                if !matches {
                    warn!(
                        dependency = %entry.name,
                        expected = %name,
                        "Ignoring plan entry for another dependency"
                    );
                }
                matches
            })
            .collect();

        if entries.is_empty() {
            debug!(dependency = %name, "No plan entries to resolve");
            return ResolvedEntry::empty(name);
        }

        warn_on_duplicate_sources(&entries);

        // sort_by_key is stable, so equal ranks keep input order
        let mut ordered = entries.clone();
        ordered.sort_by_key(|entry| std::cmp::Reverse(entry.source().priority()));

        let flags = entries
            .iter()
            .fold(EntryFlags::default(), |acc, entry| acc.union(entry.flags()));

        self.emitter.candidates(&ordered);

        let winner = ordered.iter().find(|entry| entry.version().is_some());

        match winner {
            Some(winner) => {
                debug!(
                    dependency = %name,
                    source = %winner.source(),
                    version = winner.version().unwrap_or_default(),
                    candidates = entries.len(),
                    "Resolved plan entry"
                );
                ResolvedEntry {
                    name,
                    source: winner.source().clone(),
                    version: winner.version().map(str::to_string),
                    flags,
                }
            }
            None => {
                debug!(
                    dependency = %name,
                    candidates = entries.len(),
                    "No plan entry specifies a version"
                );
                ResolvedEntry {
                    flags,
                    ..ResolvedEntry::empty(name)
                }
            }
        }
    }
}

fn warn_on_duplicate_sources(entries: &[&VersionRequest]) {
    let mut seen = HashSet::new();
    for entry in entries.iter().filter(|entry| entry.version().is_some()) {
        if !seen.insert(entry.source()) {
            warn!(
                source = %entry.source(),
                "Multiple plan entries share a version source; the first one takes precedence"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_emitter::SharedBuffer;
    use crate::plan::VersionSource;

    fn resolver() -> (PlanEntryResolver, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (
            PlanEntryResolver::new(LogEmitter::new(buffer.clone())),
            buffer,
        )
    }

    #[test]
    fn test_buildpack_yml_beats_unknown() {
        let (resolver, buffer) = resolver();

        let entry = resolver.resolve(&[
            VersionRequest::new(VersionSource::Unknown, "other-version"),
            VersionRequest::new(VersionSource::BuildpackYml, "buildpack-yml-version"),
        ]);

        assert_eq!(entry.version.as_deref(), Some("buildpack-yml-version"));
        assert_eq!(entry.source, VersionSource::BuildpackYml);
        assert!(entry.flags.is_empty());

        let output = buffer.contents();
        assert!(output.contains("    Candidate version sources (in priority order):"));
        assert!(output.contains("      buildpack.yml -> \"buildpack-yml-version\""));
        assert!(output.contains("      <unknown>     -> \"other-version\""));

        let yml_pos = output.find("buildpack.yml ->").unwrap();
        let unknown_pos = output.find("<unknown>").unwrap();
        assert!(yml_pos < unknown_pos);
    }

    #[test]
    fn test_flags_are_ored_from_losing_entries() {
        let (resolver, _) = resolver();

        let entry = resolver.resolve(&[
            VersionRequest::new(VersionSource::BuildpackYml, "buildpack-yml-version"),
            VersionRequest::flags_only(EntryFlags::build()),
        ]);

        assert_eq!(entry.version.as_deref(), Some("buildpack-yml-version"));
        assert_eq!(entry.flags, EntryFlags::build());
    }

    #[test]
    fn test_single_unknown_entry() {
        let (resolver, _) = resolver();

        let entry = resolver.resolve(&[VersionRequest::new(VersionSource::Unknown, "other-version")]);

        assert_eq!(entry.version.as_deref(), Some("other-version"));
        assert_eq!(entry.source, VersionSource::Unknown);
        assert_eq!(entry.flags, EntryFlags::default());
    }

    #[test]
    fn test_empty_input() {
        let (resolver, buffer) = resolver();

        let entry = resolver.resolve(&[]);

        assert_eq!(entry, ResolvedEntry::empty(BUNDLER));
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_flags_only_entries_have_no_winner() {
        let (resolver, buffer) = resolver();

        let entry = resolver.resolve(&[
            VersionRequest::flags_only(EntryFlags::launch()),
            VersionRequest::flags_only(EntryFlags::build()),
        ]);

        assert_eq!(entry.version, None);
        assert_eq!(entry.source, VersionSource::Unknown);
        assert!(entry.flags.build && entry.flags.launch);
        assert!(buffer.contents().contains("<unknown> -> \"*\""));
    }

    #[test]
    fn test_higher_rank_without_version_does_not_win() {
        let (resolver, _) = resolver();

        let mut labelled_but_empty = VersionRequest::flags_only(EntryFlags::launch());
        labelled_but_empty.metadata.version_source = VersionSource::BuildpackYml;

        let entry = resolver.resolve(&[
            labelled_but_empty,
            VersionRequest::new(VersionSource::GemfileLock, "2.1.4"),
        ]);

        assert_eq!(entry.version.as_deref(), Some("2.1.4"));
        assert_eq!(entry.source, VersionSource::GemfileLock);
        assert!(entry.flags.launch);
    }

    #[test]
    fn test_resolution_is_permutation_invariant() {
        let entries = vec![
            VersionRequest::new(VersionSource::Unknown, "1.17.3"),
            VersionRequest::new(VersionSource::GemfileLock, "2.1.4"),
            VersionRequest::new(VersionSource::BuildpackYml, "2.2.33").with_flags(EntryFlags::launch()),
            VersionRequest::new(VersionSource::Custom("Gemfile".into()), "2.0.2"),
            VersionRequest::flags_only(EntryFlags::build()),
        ];

        let (resolver, _) = resolver();
        let expected = resolver.resolve(&entries);
        assert_eq!(expected.version.as_deref(), Some("2.2.33"));
        assert_eq!(expected.flags, EntryFlags::build().union(EntryFlags::launch()));

        // every rotation and its reverse
        for shift in 0..entries.len() {
            let mut rotated = entries.clone();
            rotated.rotate_left(shift);
            assert_eq!(resolver.resolve(&rotated), expected);
            rotated.reverse();
            assert_eq!(resolver.resolve(&rotated), expected);
        }
    }

    #[test]
    fn test_entries_for_other_dependencies_are_ignored() {
        let (resolver, buffer) = resolver();

        let mut other = VersionRequest::new(VersionSource::BuildpackYml, "3.0.0")
            .with_flags(EntryFlags::launch());
        other.name = "ruby".to_string();

        let entry = resolver.resolve(&[
            other.clone(),
            VersionRequest::new(VersionSource::GemfileLock, "2.1.4"),
        ]);

        assert_eq!(entry.name, BUNDLER);
        assert_eq!(entry.version.as_deref(), Some("2.1.4"));
        assert!(entry.flags.is_empty());
        assert!(!buffer.contents().contains("3.0.0"));

        let entry = resolver.resolve(&[other]);
        assert_eq!(entry, ResolvedEntry::empty(BUNDLER));
    }

    #[test]
    fn test_same_source_keeps_input_order() {
        let (resolver, _) = resolver();

        let entry = resolver.resolve(&[
            VersionRequest::new(VersionSource::GemfileLock, "first"),
            VersionRequest::new(VersionSource::GemfileLock, "second"),
        ]);

        assert_eq!(entry.version.as_deref(), Some("first"));
    }

    #[test]
    fn test_custom_source_outranks_unknown_only() {
        let (resolver, _) = resolver();

        let entry = resolver.resolve(&[
            VersionRequest::new(VersionSource::Unknown, "2.0.2"),
            VersionRequest::new(VersionSource::Custom(".bundler-version".into()), "2.3.26"),
        ]);
        assert_eq!(entry.version.as_deref(), Some("2.3.26"));

        let entry = resolver.resolve(&[
            VersionRequest::new(VersionSource::Custom(".bundler-version".into()), "2.3.26"),
            VersionRequest::new(VersionSource::GemfileLock, "2.1.4"),
        ]);
        assert_eq!(entry.version.as_deref(), Some("2.1.4"));
    }
}
