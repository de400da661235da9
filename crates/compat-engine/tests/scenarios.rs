use compat_core::{parse_version, SemanticVersion};
use compat_engine::{AdvisoryKind, CompatEngine, PluginFinding, Tier};

const INSTALL_LINE: &str = "Key commands: npm install --save-dev @typescript-eslint/eslint-plugin@^8.39.0 @typescript-eslint/parser@^8.39.0";

fn engine() -> CompatEngine {
    CompatEngine::default()
}

#[test]
fn typescript_5_9_needs_the_v8_line() {
    let rec = engine().recommend("5.9.2", None);
    assert_eq!(
        rec.lines(),
        &[
            "Detected TypeScript 5.9.2.".to_string(),
            "Install @typescript-eslint packages at >=8.39.0 to get official support for this TypeScript release.".to_string(),
            INSTALL_LINE.to_string(),
        ]
    );
    assert_eq!(rec.report().unwrap().tier(), Tier::SupportedUpcoming);
}

#[test]
fn typescript_5_2_needs_no_action() {
    let rec = engine().recommend("5.2.0", None);
    let text = rec.text();
    assert!(text.contains("No action required"));
    assert!(!text.contains("Install @typescript-eslint packages at"));
    assert_eq!(rec.report().unwrap().tier(), Tier::SupportedCurrent);
}

#[test]
fn legacy_plugin_with_newer_typescript_warns() {
    let rec = engine().recommend("5.9.2", Some("6.5.0"));
    assert!(rec.lines().contains(
        &"Your @typescript-eslint version is too old for the detected TypeScript release. Upgrade to the v8 line.".to_string()
    ));
}

#[test]
fn current_plugin_with_unsupported_typescript_warns() {
    let warning = "Even the latest @typescript-eslint versions may not support this TypeScript release yet. Expect warnings until upstream updates.";

    let rec = engine().recommend("6.0.1", Some("8.39.0"));
    assert!(rec.lines().iter().any(|line| line == warning));
    assert_eq!(
        rec.report().unwrap().plugin(),
        Some(&PluginFinding::Detected {
            version: SemanticVersion::new(8, 39, 0),
            advisory: Some(AdvisoryKind::PluginAheadOfSupport),
        })
    );

    // 5.9.2 is inside the v8 range, so the current line is fine
    let rec = engine().recommend("5.9.2", Some("8.39.0"));
    assert!(!rec.lines().iter().any(|line| line == warning));
}

#[test]
fn unparsable_typescript_yields_one_line() {
    let rec = engine().recommend("not-a-version", None);
    assert_eq!(rec.lines().len(), 1);
    assert!(rec.report().is_none());
    assert_eq!(
        rec.text(),
        "Unable to parse the TypeScript version. Provide a semantic version such as 5.9.2."
    );
}

#[test]
fn no_plugin_lines_without_plugin_input() {
    for raw in ["4.9.5", "5.3.3", "5.4.0", "5.9.2", "6.0.0", "7.0.0-dev"] {
        let rec = engine().recommend(raw, None);
        assert!(
            !rec.lines().iter().any(|line| line.contains("plugin version")
                || line.starts_with("Detected @typescript-eslint")
                || line.starts_with("Your @typescript-eslint")
                || line.starts_with("Even the latest")),
            "{raw}: {:?}",
            rec.lines()
        );
    }
}

#[test]
fn spelling_variants_agree() {
    let baseline = engine().recommend("5.3.0", None);
    for raw in ["5.3", "v5.3.0", "~5.3.0", "typescript@5.3"] {
        assert_eq!(engine().recommend(raw, None), baseline, "{raw}");
    }
}

#[test]
fn major_seven_plugin_is_silent() {
    for ts in ["5.2.0", "5.9.2", "6.1.0"] {
        let rec = engine().recommend(ts, Some("7.18.0"));
        let finding = rec.report().unwrap().plugin().unwrap();
        assert_eq!(
            finding,
            &PluginFinding::Detected {
                version: SemanticVersion::new(7, 18, 0),
                advisory: None,
            }
        );
    }
}

#[test]
fn canonical_rendering_reparses_identically() {
    for raw in ["5.9.2", "v5", "6.0.0-beta.3", "^8.39.1"] {
        let first = parse_version(raw).into_version().unwrap();
        let second = parse_version(&first.to_string()).into_version().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.prerelease(), second.prerelease());
    }
}
