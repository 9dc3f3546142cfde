use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

/// Point the simulation at the small fixture galaxy shared by these tests.
pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_galaxy_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test galaxy config at {}",
            config_path.display()
        );

        std::env::set_var(dark_forest_sim::GALAXY_CONFIG_ENV, &config_path);
    });
}
