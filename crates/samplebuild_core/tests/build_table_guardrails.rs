use std::collections::HashMap;

use samplebuild_core::build_type::{BuildPlan, BuildType};
use samplebuild_core::platform::Platform;

const CLASS: &str = "Zenject.Internal.SampleBuilder";

#[test]
fn build_type_names_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, BuildType> = HashMap::new();

    for name in BuildType::NAMES {
        let parsed: BuildType = name.parse().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed.name(), name, "name mismatch for {:?}", parsed);

        if let Some(prev) = seen.insert(name, parsed) {
            panic!("duplicate build type spelling {:?}: {:?} and {:?}", name, prev, parsed);
        }
    }

    assert_eq!(seen.len(), BuildType::CONCRETE.len() + 1);
}

#[test]
fn every_concrete_build_type_has_a_config() {
    for build_type in BuildType::CONCRETE {
        assert!(build_type.config().is_some(), "{} has no config", build_type);
    }
    assert!(BuildType::All.config().is_none());
}

#[test]
fn every_plan_switches_runtime_on_windows_then_builds_on_target() {
    for build_type in BuildType::CONCRETE {
        let config = build_type.config().expect("concrete build type");
        let plan = BuildPlan::for_build_types(&[build_type], CLASS, false);
        let steps = plan.steps();

        let first = steps.first().expect("plan has steps");
        assert_eq!(first.platform, Platform::Windows, "{}: runtime switch platform", build_type);
        assert_eq!(
            first.method,
            format!("{}.{}", CLASS, config.runtime.enable_function()),
            "{}: first step",
            build_type
        );

        let last = steps.last().expect("plan has steps");
        assert_eq!(last.method, format!("{}.BuildRelease", CLASS), "{}: last step", build_type);
        assert_eq!(last.platform, config.platform, "{}: build platform", build_type);

        let has_backend_step = steps.iter().any(|s| s.method.contains(".EnableBackend"));
        assert_eq!(
            has_backend_step,
            config.platform.supports_backend_choice(),
            "{}: backend step presence",
            build_type
        );
    }
}

#[test]
fn all_equals_concatenation_of_concrete_types() {
    let all = BuildPlan::for_build_types(&[BuildType::All], CLASS, true);
    let concatenated = BuildPlan::for_build_types(&BuildType::CONCRETE, CLASS, true);
    assert_eq!(all, concatenated);
}
