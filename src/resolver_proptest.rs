//! Property-based tests for configuration resolution.
//!
//! Random subsets of the explicit, local and shared candidates are created
//! on disk and the resolver's choice is checked against the priority rules.

#[cfg(test)]
mod proptest_tests {
    use crate::resolver::{resolve, ConfigSource};
    use proptest::prelude::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Which of the candidate files exist on disk.
    #[derive(Debug, Clone)]
    struct Layout {
        tool: String,
        explicit: Option<bool>,
        local: Vec<bool>,
        shared: Vec<bool>,
    }

    fn layout() -> impl Strategy<Value = Layout> {
        (
            "[a-z][a-z-]{0,12}",
            proptest::option::of(any::<bool>()),
            proptest::collection::vec(any::<bool>(), 0..4),
            proptest::collection::vec(any::<bool>(), 0..4),
        )
            .prop_map(|(tool, explicit, local, shared)| Layout {
                tool,
                explicit,
                local,
                shared,
            })
    }

    /// Create the layout and return candidate paths per tier.
    fn materialize(
        dir: &TempDir,
        layout: &Layout,
    ) -> (Option<PathBuf>, Vec<PathBuf>, Vec<PathBuf>) {
        let mk = |name: String, exists: bool| {
            let path = dir.path().join(name);
            if exists {
                fs::write(&path, "cfg").unwrap();
            }
            path
        };
        let explicit = layout.explicit.map(|e| mk("explicit".to_string(), e));
        let local = layout
            .local
            .iter()
            .enumerate()
            .map(|(i, e)| mk(format!("local-{}", i), *e))
            .collect();
        let shared = layout
            .shared
            .iter()
            .enumerate()
            .map(|(i, e)| mk(format!("shared-{}", i), *e))
            .collect();
        (explicit, local, shared)
    }

    proptest! {
        /// Property: an existing explicit path is always selected
        #[test]
        fn existing_explicit_always_wins(layout in layout()) {
            let dir = TempDir::new().unwrap();
            let layout = Layout { explicit: Some(true), ..layout };
            let (explicit, local, shared) = materialize(&dir, &layout);

            let resolved = resolve(&layout.tool, explicit.as_deref(), &local, &shared).unwrap();
            prop_assert_eq!(resolved.source, ConfigSource::Explicit);
            prop_assert_eq!(Some(resolved.path), explicit);
        }

        /// Property: without an explicit path, an existing local candidate
        /// beats any shared candidate, and the first existing one is chosen
        #[test]
        fn local_beats_shared(layout in layout()) {
            let dir = TempDir::new().unwrap();
            let layout = Layout { explicit: None, ..layout };
            let (_, local, shared) = materialize(&dir, &layout);

            let first_local = layout.local.iter().position(|e| *e);
            let first_shared = layout.shared.iter().position(|e| *e);
            let result = resolve(&layout.tool, None, &local, &shared);

            match (first_local, first_shared) {
                (Some(i), _) => {
                    let resolved = result.unwrap();
                    prop_assert_eq!(resolved.source, ConfigSource::Local);
                    prop_assert_eq!(&resolved.path, &local[i]);
                }
                (None, Some(i)) => {
                    let resolved = result.unwrap();
                    prop_assert_eq!(resolved.source, ConfigSource::Shared);
                    prop_assert_eq!(&resolved.path, &shared[i]);
                }
                (None, None) => prop_assert!(result.is_err()),
            }
        }

        /// Property: resolution fails exactly when no candidate exists
        #[test]
        fn not_found_iff_nothing_exists(layout in layout()) {
            let dir = TempDir::new().unwrap();
            let (explicit, local, shared) = materialize(&dir, &layout);
            let any_exists = layout.explicit == Some(true)
                || layout.local.iter().any(|e| *e)
                || layout.shared.iter().any(|e| *e);

            let result = resolve(&layout.tool, explicit.as_deref(), &local, &shared);
            prop_assert_eq!(result.is_ok(), any_exists);
            if let Err(e) = result {
                prop_assert_eq!(e.exit_code(), 2);
            }
        }
    }
}
