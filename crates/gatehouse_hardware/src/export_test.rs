#[cfg(test)]
mod tests {
    use crate::bundle::build_config_bundle;
    use crate::error::HardwareError;
    use crate::export::{export_config_bundle, Clipboard, DirectoryShare, ExportOutcome, ShareTarget};
    use crate::flow::{IssuedCredential, RelaySettings};
    use gatehouse_common::DeviceSecret;
    use gatehouse_config::BundleDefaults;
    use std::cell::RefCell;
    use std::io;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct RecordingClipboard {
        text: RefCell<Option<String>>,
        broken: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn copy_text(&self, text: &str) -> io::Result<()> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::Other, "no clipboard"));
            }
            *self.text.borrow_mut() = Some(text.to_string());
            Ok(())
        }
    }

    /// Stands in for a terminal that prints instead of copying.
    #[derive(Default)]
    struct PrintingClipboard {
        printed: RefCell<Vec<String>>,
    }

    impl Clipboard for PrintingClipboard {
        fn copy_text(&self, text: &str) -> io::Result<()> {
            self.printed.borrow_mut().push(text.to_string());
            Ok(())
        }

        fn describe(&self) -> String {
            "printed to the terminal".to_string()
        }
    }

    /// Remembers the temp path and what it contained while shared.
    #[derive(Default)]
    struct PeekShare {
        seen: RefCell<Option<(PathBuf, String)>>,
    }

    impl ShareTarget for PeekShare {
        fn share(&self, file: &Path, file_name: &str) -> io::Result<String> {
            let contents = std::fs::read_to_string(file)?;
            *self.seen.borrow_mut() = Some((file.to_path_buf(), contents));
            Ok(format!("peek:{}", file_name))
        }
    }

    struct FailingShare;

    impl ShareTarget for FailingShare {
        fn share(&self, _file: &Path, _file_name: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "share sheet dismissed"))
        }
    }

    fn credential() -> IssuedCredential {
        IssuedCredential::new(
            "dev-1",
            "GATE-AB12",
            "Entrada Principal",
            RelaySettings::default(),
            DeviceSecret::new("xyz"),
        )
    }

    #[test]
    fn test_share_uses_temp_file_that_is_removed() {
        let credential = credential();
        let defaults = BundleDefaults::default();
        let bundle = build_config_bundle(&credential, "loc-1", "https://api.example.com", &defaults);
        let share = PeekShare::default();
        let clipboard = RecordingClipboard::default();

        let outcome = export_config_bundle(&bundle, Some(&share), &clipboard).unwrap();

        assert_eq!(
            outcome,
            ExportOutcome::Shared {
                destination: "peek:agent-config-GATE-AB12.json".to_string()
            }
        );
        let (path, contents) = share.seen.borrow_mut().take().unwrap();
        assert!(contents.contains("\"deviceSecret\": \"xyz\""));
        assert!(!path.exists(), "temp file should be gone after sharing");
        assert!(clipboard.text.borrow().is_none());
    }

    #[test]
    fn test_without_share_target_copies_to_clipboard() {
        let credential = credential();
        let defaults = BundleDefaults::default();
        let bundle = build_config_bundle(&credential, "loc-1", "u", &defaults);
        let clipboard = RecordingClipboard::default();

        let outcome = export_config_bundle(&bundle, None, &clipboard).unwrap();

        assert_eq!(
            outcome,
            ExportOutcome::Fallback {
                via: "copied to the clipboard".to_string(),
                share_error: None,
            }
        );
        assert_eq!(
            outcome.describe(),
            "Sharing is not available; the configuration was copied to the clipboard instead."
        );
        let copied = clipboard.text.borrow().clone().unwrap();
        let json: serde_json::Value = serde_json::from_str(&copied).unwrap();
        assert_eq!(json["auth"]["deviceCode"], "GATE-AB12");
    }

    #[test]
    fn test_fallback_names_the_surface_used() {
        let credential = credential();
        let defaults = BundleDefaults::default();
        let bundle = build_config_bundle(&credential, "loc-1", "u", &defaults);
        let terminal = PrintingClipboard::default();

        let outcome = export_config_bundle(&bundle, Some(&FailingShare), &terminal).unwrap();

        let message = outcome.describe();
        assert!(message.ends_with("the configuration was printed to the terminal instead."));
        assert!(!message.contains("clipboard"));
        assert_eq!(terminal.printed.borrow().len(), 1);
    }

    #[test]
    fn test_failed_share_falls_back_and_says_so() {
        let credential = credential();
        let defaults = BundleDefaults::default();
        let bundle = build_config_bundle(&credential, "loc-1", "u", &defaults);
        let clipboard = RecordingClipboard::default();

        let outcome = export_config_bundle(&bundle, Some(&FailingShare), &clipboard).unwrap();

        match &outcome {
            ExportOutcome::Fallback {
                share_error: Some(err),
                ..
            } => assert!(err.contains("share sheet dismissed")),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(outcome.describe().starts_with("Sharing failed"));
        assert!(clipboard.text.borrow().is_some());
    }

    #[test]
    fn test_both_paths_failing_is_an_error() {
        let credential = credential();
        let defaults = BundleDefaults::default();
        let bundle = build_config_bundle(&credential, "loc-1", "u", &defaults);
        let clipboard = RecordingClipboard {
            broken: true,
            ..RecordingClipboard::default()
        };

        let err = export_config_bundle(&bundle, Some(&FailingShare), &clipboard).unwrap_err();
        assert!(matches!(err, HardwareError::Export(_)));
    }

    #[test]
    fn test_directory_share_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let credential = credential();
        let defaults = BundleDefaults::default();
        let bundle = build_config_bundle(&credential, "loc-1", "u", &defaults);
        let share = DirectoryShare::new(dir.path());
        let clipboard = RecordingClipboard::default();

        let outcome = export_config_bundle(&bundle, Some(&share), &clipboard).unwrap();

        let written = dir.path().join("agent-config-GATE-AB12.json");
        assert!(matches!(outcome, ExportOutcome::Shared { .. }));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(json["locationId"], "loc-1");
    }

    #[test]
    fn test_directory_share_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let share = DirectoryShare::new(dir.path().join("missing"));
        let source = dir.path().join("src.json");
        std::fs::write(&source, "{}").unwrap();

        assert!(share.share(&source, "x.json").is_err());
    }
}
