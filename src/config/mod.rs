//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`PANELAUNCH_SESSION`, `PANELAUNCH_PROGRAM`,
//!    `PANELAUNCH_WORKSPACE`)
//! 2. TOML file specified via `--config`
//! 3. `./panelaunch.toml` in the current directory
//! 4. `$XDG_CONFIG_HOME/panelaunch/panelaunch.toml` (or
//!    `~/.config/panelaunch/panelaunch.toml`)
//! 5. Built-in defaults

mod defaults;
mod env;
mod init;
mod loader;
mod sources;
mod types;

pub use init::{config_root_dir, default_global_config_path, initialize_default_global_config};
pub use loader::{load_config, validate, LoadedConfig};
pub use sources::ConfigSource;
pub use types::{
    AgentEntry, Config, DeliveryConfig, GlobalConfigInitResult, ReadinessConfig, ScheduleConfig,
    ScheduleMode, SessionConfig, TimingConfig,
};

#[cfg(test)]
mod tests {
    use super::defaults::DEFAULT_CONFIG_TEMPLATE;
    use super::init::initialize_config_at_path;
    use super::loader::load_config_from_sources;
    use super::*;
    use crate::coordinator::Schedule;
    use crate::error::ConfigError;
    use crate::testsupport::TestTempDir;
    use crate::types::Strategy;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn load_with(
        files: &[(&str, &str)],
        env: &[(&str, &str)],
        path_override: Option<&Path>,
    ) -> Result<LoadedConfig, ConfigError> {
        let files: BTreeMap<PathBuf, String> = files
            .iter()
            .map(|(path, text)| (PathBuf::from(path), text.to_string()))
            .collect();
        let env: BTreeMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_from_sources(
            path_override,
            |path| {
                files.get(path).cloned().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing")
                })
            },
            |name| env.get(name).cloned(),
            || Some(PathBuf::from("/cfg")),
        )
    }

    #[test]
    fn defaults_are_sensible() {
        let c = Config::default();
        assert_eq!(c.session.name, "api_builder");
        assert_eq!(c.session.program, "claude");
        assert_eq!(c.agents.len(), 9);
        assert_eq!(c.agents[0].label, "orchestrator");
        assert_eq!(c.agents[8].title, "DevOps Engineer");
        assert_eq!(c.delivery.strategies, vec![Strategy::Atomic, Strategy::Chunked]);
        assert_eq!(c.delivery.chunk_lines, 100);
        assert_eq!(c.schedule.max_active, 4);
        assert!(!c.delivery.clear_before_fallback);
        assert_eq!(c.launch_timings(), crate::launcher::LaunchTimings::default());
        assert!(c.readiness_probe().is_none());
        assert!(validate(&c).is_ok());
    }

    #[test]
    fn bundled_template_parses_to_the_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).expect("template parses");
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let loaded = load_with(&[], &[], None).expect("load");
        assert_eq!(loaded.source, ConfigSource::BuiltInDefaults);
        assert_eq!(loaded.config, Config::default());
    }

    #[test]
    fn local_file_wins_over_global() {
        let loaded = load_with(
            &[
                ("panelaunch.toml", "[session]\nname = \"local\"\n"),
                ("/cfg/panelaunch/panelaunch.toml", "[session]\nname = \"global\"\n"),
            ],
            &[],
            None,
        )
        .expect("load");
        assert_eq!(loaded.source, ConfigSource::Local);
        assert_eq!(loaded.config.session.name, "local");
        // Untouched keys keep their defaults.
        assert_eq!(loaded.config.session.program, "claude");
    }

    #[test]
    fn global_file_is_used_when_no_local_file_exists() {
        let loaded = load_with(
            &[("/cfg/panelaunch/panelaunch.toml", "[schedule]\nmode = \"parallel\"\n")],
            &[],
            None,
        )
        .expect("load");
        assert_eq!(
            loaded.source,
            ConfigSource::Global(PathBuf::from("/cfg/panelaunch/panelaunch.toml"))
        );
        assert_eq!(
            loaded.config.schedule(),
            Schedule::Parallel {
                max_active: 4,
                stagger: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_with(
            &[("panelaunch.toml", "")],
            &[],
            Some(Path::new("/nope/custom.toml")),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let loaded = load_with(
            &[("panelaunch.toml", "[session]\nname = \"file\"\nprogram = \"claude\"\n")],
            &[
                ("PANELAUNCH_SESSION", "from-env"),
                ("PANELAUNCH_PROGRAM", "  "),
                ("PANELAUNCH_WORKSPACE", "/tmp/ws"),
            ],
            None,
        )
        .expect("load");
        assert_eq!(loaded.config.session.name, "from-env");
        assert_eq!(loaded.config.session.program, "claude");
        assert_eq!(loaded.config.session.workspace, PathBuf::from("/tmp/ws"));
    }

    #[test]
    fn custom_roster_replaces_the_default_team() {
        let text = r#"
[[agents]]
label = "api"
title = "API Developer"
prompt = "fastapi"

[[agents]]
label = "qa"
title = "QA"
"#;
        let loaded = load_with(&[("panelaunch.toml", text)], &[], None).expect("load");
        let agents = &loaded.config.agents;
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].prompt_key(), "fastapi");
        assert_eq!(agents[1].prompt_key(), "qa");
    }

    #[test]
    fn delivery_section_maps_to_runtime_settings() {
        let text = r#"
[delivery]
strategies = ["line", "chunked"]
chunk_lines = 50
submit_settle_ms = 0
clear_before_fallback = true
newline_key = "S-Enter"

[readiness]
marker = "? for shortcuts"
poll_ms = 100
timeout_ms = 2000
"#;
        let config = load_with(&[("panelaunch.toml", text)], &[], None)
            .expect("load")
            .config;
        let settings = config.delivery_settings();
        assert_eq!(settings.plan, vec![Strategy::LineLiteral, Strategy::Chunked]);
        assert_eq!(settings.chunk_lines, 50);
        assert_eq!(settings.submit_settle, Duration::ZERO);
        assert!(settings.clear_before_fallback);
        assert_eq!(config.key_bindings().newline, "S-Enter");
        assert_eq!(config.key_bindings().submit, "Enter");
        let probe = config.readiness_probe().expect("probe");
        assert_eq!(probe.marker, "? for shortcuts");
        assert_eq!(probe.timeout, Duration::from_secs(2));
    }

    #[test]
    fn validation_rejects_unrunnable_configs() {
        let cases = [
            "[session]\nname = \"  \"\n",
            "[delivery]\nchunk_lines = 0\n",
            "[delivery]\nstrategies = []\n",
            "[schedule]\nmax_active = 0\n",
            "agents = []\n",
            "[[agents]]\nlabel = \"a\"\ntitle = \"A\"\n[[agents]]\nlabel = \"a\"\ntitle = \"B\"\n",
        ];
        for text in cases {
            let err = load_with(&[("panelaunch.toml", text)], &[], None).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{text:?} gave {err}");
        }
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let err = load_with(
            &[("panelaunch.toml", "[delivery]\nstrategies = [\"telepathy\"]\n")],
            &[],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn helper_path_expands_home() {
        let mut config = Config::default();
        config.delivery.helper = Some(PathBuf::from("~/bin/send.sh"));
        let helper = config.delivery_helper().expect("helper");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(helper.path(), home.join("bin/send.sh"));
        }
    }

    #[test]
    fn init_creates_then_preserves_then_backs_up() {
        let tmp = TestTempDir::new("config-init");
        let path = tmp.child("nested/panelaunch.toml");

        let created = initialize_config_at_path(&path, false).expect("create");
        assert_eq!(created, GlobalConfigInitResult::Created { path: path.clone() });
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            DEFAULT_CONFIG_TEMPLATE
        );

        std::fs::write(&path, "# mine\n").expect("edit");
        let kept = initialize_config_at_path(&path, false).expect("keep");
        assert_eq!(kept, GlobalConfigInitResult::AlreadyInitialized { path: path.clone() });
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# mine\n");

        let GlobalConfigInitResult::Overwritten { backup_path, .. } =
            initialize_config_at_path(&path, true).expect("force")
        else {
            panic!("expected overwrite");
        };
        assert_eq!(std::fs::read_to_string(&backup_path).expect("backup"), "# mine\n");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            DEFAULT_CONFIG_TEMPLATE
        );
    }
}
