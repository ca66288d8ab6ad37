//! Where an artifact root currently sits in `Untrained → Trained → Exported → Converted`.

use std::fmt;

use crate::artifact::ArtifactLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineState {
    Untrained,
    Trained,
    Exported,
    Converted,
}

impl PipelineState {
    /// Inspects the files under `layout`.
    ///
    /// Each state requires every predecessor's artifacts as well, so a root
    /// with a conversion bundle but no training outputs reports `Untrained`.
    pub fn detect(layout: &ArtifactLayout) -> Self {
        let trained = [layout.vocab_path(), layout.idf_path(), layout.metadata_path()]
            .iter()
            .all(|p| p.is_file());
        if !trained {
            return Self::Untrained;
        }

        let exported = layout.interchange_path().is_file() && layout.export_manifest_path().is_file();
        if !exported {
            return Self::Trained;
        }

        let converted = [
            layout.model_json_path(),
            layout.weights_path(),
            layout.conversion_manifest_path(),
        ]
        .iter()
        .all(|p| p.is_file());
        if converted {
            Self::Converted
        } else {
            Self::Exported
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Untrained => "untrained",
            Self::Trained => "trained",
            Self::Exported => "exported",
            Self::Converted => "converted",
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &std::path::Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"{}").unwrap();
    }

    #[test]
    fn test_detect_progression() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        assert_eq!(PipelineState::detect(&layout), PipelineState::Untrained);

        touch(&layout.vocab_path());
        touch(&layout.idf_path());
        assert_eq!(PipelineState::detect(&layout), PipelineState::Untrained);
        touch(&layout.metadata_path());
        assert_eq!(PipelineState::detect(&layout), PipelineState::Trained);

        touch(&layout.interchange_path());
        touch(&layout.export_manifest_path());
        assert_eq!(PipelineState::detect(&layout), PipelineState::Exported);

        touch(&layout.model_json_path());
        touch(&layout.weights_path());
        touch(&layout.conversion_manifest_path());
        assert_eq!(PipelineState::detect(&layout), PipelineState::Converted);

        fs::remove_file(layout.metadata_path()).unwrap();
        assert_eq!(PipelineState::detect(&layout), PipelineState::Untrained);
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(PipelineState::Untrained < PipelineState::Trained);
        assert!(PipelineState::Exported < PipelineState::Converted);
        assert_eq!(PipelineState::Exported.to_string(), "exported");
    }
}
