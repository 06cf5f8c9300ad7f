// Path and File Name : /home/decepticloud/core/deception/src/tests/registry_tests.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Tests for the honeypot asset registry - schema validation, one asset per kind, YAML loading, marker defaults

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use crate::asset::AssetKind;
    use crate::errors::DeceptionError;
    use crate::registry::{AssetDefinition, HoneypotRegistry};
    use crate::signals::RecordFormat;

    fn definition(asset_id: &str, kind: AssetKind) -> AssetDefinition {
        AssetDefinition {
            asset_id: asset_id.to_string(),
            kind,
            log_path: PathBuf::from(format!("/tmp/{}.log", asset_id)),
            log_format: None,
            attack_markers: Vec::new(),
        }
    }

    #[test]
    fn test_defaults_cover_both_kinds() {
        let registry = HoneypotRegistry::with_defaults();
        assert_eq!(registry.asset_id(AssetKind::Ssh), "cowrie_honeypot");
        assert_eq!(registry.asset_id(AssetKind::Web), "web_honeypot");
        assert_eq!(registry.get(AssetKind::Ssh).record_format(), RecordFormat::JsonEvent);
        assert_eq!(registry.get(AssetKind::Web).record_format(), RecordFormat::TextLine);
        assert!(registry.source().is_none());
    }

    #[test]
    fn test_missing_kind_rejected() {
        let result = HoneypotRegistry::from_definitions(vec![definition("ssh-a", AssetKind::Ssh)]);
        assert!(matches!(result, Err(DeceptionError::RegistryValidationFailed(_))));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let result = HoneypotRegistry::from_definitions(vec![
            definition("ssh-a", AssetKind::Ssh),
            definition("ssh-b", AssetKind::Ssh),
            definition("web-a", AssetKind::Web),
        ]);
        assert!(matches!(result, Err(DeceptionError::RegistryValidationFailed(_))));
    }

    #[test]
    fn test_duplicate_asset_id_rejected() {
        let result = HoneypotRegistry::from_definitions(vec![
            definition("honeypot", AssetKind::Ssh),
            definition("honeypot", AssetKind::Web),
        ]);
        assert!(matches!(result, Err(DeceptionError::RegistryValidationFailed(_))));
    }

    #[test]
    fn test_schema_validation() {
        let mut empty_id = definition("", AssetKind::Ssh);
        empty_id.asset_id = "  ".to_string();
        assert!(HoneypotRegistry::from_definitions(vec![empty_id, definition("web", AssetKind::Web)]).is_err());

        let bad_id = definition("bad/id", AssetKind::Ssh);
        assert!(HoneypotRegistry::from_definitions(vec![bad_id, definition("web", AssetKind::Web)]).is_err());

        let mut empty_marker = definition("ssh", AssetKind::Ssh);
        empty_marker.attack_markers = vec!["".to_string()];
        assert!(HoneypotRegistry::from_definitions(vec![empty_marker, definition("web", AssetKind::Web)]).is_err());
    }

    #[test]
    fn test_marker_defaults_follow_format() {
        let mut ssh_text = definition("ssh", AssetKind::Ssh);
        ssh_text.log_format = Some(RecordFormat::TextLine);
        assert!(ssh_text.markers().iter().any(|m| m == "Login attempt"));

        let cowrie = definition("cowrie", AssetKind::Ssh);
        assert!(cowrie.markers().iter().any(|m| m == "cowrie.session.connect"));

        let mut custom = definition("web", AssetKind::Web);
        custom.attack_markers = vec!["GET /admin".to_string()];
        assert_eq!(custom.markers(), vec!["GET /admin".to_string()]);
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
assets:
  - asset_id: cowrie_honeypot_local
    kind: ssh
    log_path: /var/log/cowrie/cowrie.json
  - asset_id: nginx_honeypot_local
    kind: web
    log_path: /var/log/nginx/honeypot.log
    log_format: text_line
    attack_markers:
      - "Login attempt from"
"#
        )
        .unwrap();

        let registry = HoneypotRegistry::load(file.path()).unwrap();
        assert_eq!(registry.asset_id(AssetKind::Ssh), "cowrie_honeypot_local");
        assert_eq!(registry.asset_id(AssetKind::Web), "nginx_honeypot_local");
        assert_eq!(registry.get(AssetKind::Web).markers(), vec!["Login attempt from".to_string()]);
        assert_eq!(registry.source(), Some(file.path()));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "assets:\n  - asset_id: x\n    kind: telnet\n").unwrap();
        assert!(matches!(HoneypotRegistry::load(file.path()), Err(DeceptionError::Yaml(_))));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = HoneypotRegistry::load(std::path::Path::new("/nonexistent/decepticloud/assets.yaml"));
        assert!(matches!(result, Err(DeceptionError::ConfigurationError(_))));
    }
}
