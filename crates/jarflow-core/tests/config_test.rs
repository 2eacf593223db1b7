use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jarflow_core::{ConfigError, JobConfig, WorkspaceRoots, join_slash, project_name_from_url};
use proptest::prelude::*;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn base_env() -> HashMap<String, String> {
    env(&[
        ("GIT_CLONE_URL", "https://git.example/org/app.git"),
        ("HUB_USER", "u"),
        ("HUB_TOKEN", "t"),
    ])
}

// ── Defaults ──

#[test]
fn resolves_defaults_with_minimal_env() {
    let config = JobConfig::from_env(&base_env(), &WorkspaceRoots::default()).unwrap();

    assert_eq!(config.git_clone_url(), "https://git.example/org/app.git");
    assert_eq!(config.git_ref(), "master");
    assert_eq!(config.entry_file(), "./build.gradle");
    assert_eq!(config.hub_user(), "u");
    assert_eq!(config.hub_token(), "t");
    assert!(config.hub_repo().is_none());
    assert_eq!(config.artifact_path(), "");
    assert_eq!(config.artifact_tag(), "latest");
    assert!(!config.cache_enabled());
    assert_eq!(config.project_name(), "app");
    assert_eq!(config.work_dir(), Path::new("/root/src"));
    assert_eq!(config.repo_dir(), Path::new("/root/src/app"));
    assert_eq!(config.archive_name(), "app.tar.bz");
}

#[test]
fn reads_explicit_values() {
    let mut vars = base_env();
    vars.extend(env(&[
        ("GIT_REF", "release/1.2"),
        ("ENTRY_FILE", "service/build.gradle"),
        ("HUB_REPO", "myrepo"),
        ("ARTIFACT_PATH", "jars/app"),
        ("ARTIFACT_TAG", "v1.2.0"),
    ]));

    let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();

    assert_eq!(config.git_ref(), "release/1.2");
    assert_eq!(config.entry_file(), "service/build.gradle");
    assert_eq!(config.hub_repo(), Some("myrepo"));
    assert_eq!(config.artifact_path(), "jars/app");
    assert_eq!(config.artifact_tag(), "v1.2.0");
}

#[test]
fn empty_values_count_as_unset() {
    let mut vars = base_env();
    vars.extend(env(&[
        ("GIT_REF", ""),
        ("ENTRY_FILE", ""),
        ("ARTIFACT_TAG", ""),
        ("HUB_REPO", ""),
    ]));

    let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();

    assert_eq!(config.git_ref(), "master");
    assert_eq!(config.entry_file(), "./build.gradle");
    assert_eq!(config.artifact_tag(), "latest");
    assert!(config.hub_repo().is_none());
}

// ── Clone URL and ref fallbacks ──

#[test]
fn falls_back_to_workflow_clone_url() {
    let vars = env(&[
        ("_WORKFLOW_GIT_CLONE_URL", "https://git.example/org/lib.git"),
        ("_WORKFLOW_GIT_REF", "develop"),
        ("HUB_USER", "u"),
        ("HUB_TOKEN", "t"),
    ]);

    let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();

    assert_eq!(config.git_clone_url(), "https://git.example/org/lib.git");
    assert_eq!(config.git_ref(), "develop");
    assert_eq!(config.project_name(), "lib");
}

#[test]
fn git_ref_takes_precedence_over_workflow_ref() {
    let mut vars = base_env();
    vars.extend(env(&[("GIT_REF", "main"), ("_WORKFLOW_GIT_REF", "develop")]));

    let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();
    assert_eq!(config.git_ref(), "main");
}

#[test]
fn workflow_ref_applies_with_primary_clone_url() {
    let mut vars = base_env();
    vars.insert("_WORKFLOW_GIT_REF".to_owned(), "develop".to_owned());

    let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();
    assert_eq!(config.git_ref(), "develop");
}

#[test]
fn missing_clone_url_is_config_error() {
    let vars = env(&[("HUB_USER", "u"), ("HUB_TOKEN", "t"), ("GIT_REF", "main")]);

    let err = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingCloneUrl));
    assert!(err.to_string().contains("GIT_CLONE_URL"));
}

#[test]
fn url_without_project_segment_is_rejected() {
    let vars = env(&[("GIT_CLONE_URL", ".git"), ("HUB_USER", "u"), ("HUB_TOKEN", "t")]);

    let err = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyProjectName { .. }));
}

// ── Registry credentials ──

#[test]
fn falls_back_to_workflow_credentials_when_both_missing() {
    let vars = env(&[
        ("GIT_CLONE_URL", "https://git.example/org/app.git"),
        ("_WORKFLOW_HUB_USER", "wf-user"),
        ("_WORKFLOW_HUB_TOKEN", "wf-token"),
    ]);

    let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();
    assert_eq!(config.hub_user(), "wf-user");
    assert_eq!(config.hub_token(), "wf-token");
}

#[test]
fn partial_primary_credentials_do_not_fall_back() {
    let vars = env(&[
        ("GIT_CLONE_URL", "https://git.example/org/app.git"),
        ("HUB_USER", "u"),
        ("_WORKFLOW_HUB_USER", "wf-user"),
        ("_WORKFLOW_HUB_TOKEN", "wf-token"),
    ]);

    let err = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingHubCredentials));
}

#[test]
fn missing_token_is_config_error() {
    let vars = env(&[
        ("GIT_CLONE_URL", "https://git.example/org/app.git"),
        ("HUB_USER", "u"),
    ]);

    let err = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingHubCredentials));
    assert!(err.to_string().contains("HUB_TOKEN"));
}

#[test]
fn missing_user_in_workflow_fallback_is_config_error() {
    let vars = env(&[
        ("GIT_CLONE_URL", "https://git.example/org/app.git"),
        ("_WORKFLOW_HUB_TOKEN", "wf-token"),
    ]);

    let err = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingHubCredentials));
}

#[test]
fn debug_output_redacts_token() {
    let mut vars = base_env();
    vars.insert("HUB_TOKEN".to_owned(), "super-secret-token".to_owned());

    let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();
    let debug = format!("{config:?}");

    assert!(!debug.contains("super-secret-token"));
    assert!(debug.contains("app"));
}

// ── Working directory ──

#[test]
fn cache_flag_selects_cache_space() {
    for flag in ["true", "TRUE", "True"] {
        let mut vars = base_env();
        vars.insert("_WORKFLOW_FLAG_CACHE".to_owned(), flag.to_owned());

        let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();
        assert!(config.cache_enabled(), "flag {flag:?}");
        assert_eq!(config.work_dir(), Path::new("/workflow-cache"));
        assert_eq!(config.repo_dir(), Path::new("/workflow-cache/app"));
    }
}

#[test]
fn non_true_cache_flag_selects_scratch_space() {
    for flag in ["false", "1", "yes", ""] {
        let mut vars = base_env();
        vars.insert("_WORKFLOW_FLAG_CACHE".to_owned(), flag.to_owned());

        let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();
        assert!(!config.cache_enabled(), "flag {flag:?}");
        assert_eq!(config.work_dir(), Path::new("/root/src"));
    }
}

#[test]
fn custom_roots_are_honored() {
    let tmp = TempDir::new().unwrap();
    let roots = WorkspaceRoots {
        scratch: tmp.path().join("scratch"),
        cache: tmp.path().join("cache"),
    };

    let config = JobConfig::from_env(&base_env(), &roots).unwrap();
    assert_eq!(config.repo_dir(), tmp.path().join("scratch").join("app"));

    let mut vars = base_env();
    vars.insert("_WORKFLOW_FLAG_CACHE".to_owned(), "true".to_owned());
    let config = JobConfig::from_env(&vars, &roots).unwrap();
    assert_eq!(config.repo_dir(), tmp.path().join("cache").join("app"));
}

#[test]
fn default_roots_are_fixed_spaces() {
    let roots = WorkspaceRoots::default();

    assert_eq!(roots.scratch, PathBuf::from("/root/src"));
    assert_eq!(roots.cache, PathBuf::from("/workflow-cache"));
}

// ── Project name derivation ──

#[test]
fn project_name_strips_git_suffix_and_slash() {
    assert_eq!(
        project_name_from_url("https://example.com/org/my-repo.git"),
        "my-repo"
    );
    assert_eq!(project_name_from_url("https://example.com/org/my-repo/"), "my-repo");
    assert_eq!(project_name_from_url("https://example.com/org/my-repo"), "my-repo");
    assert_eq!(project_name_from_url("git@example.com:org/svc.git"), "svc");
    assert_eq!(project_name_from_url("local-repo"), "local-repo");
}

#[test]
fn project_name_strips_only_one_trailing_slash() {
    assert_eq!(project_name_from_url("https://example.com/org/my-repo//"), "");
    assert_eq!(project_name_from_url("https://example.com/org/my-repo.git/"), "my-repo");
}

// ── Registry path joining ──

#[test]
fn join_slash_skips_empty_segments() {
    assert_eq!(join_slash(["myrepo", "", "app.tar.bz"]), "myrepo/app.tar.bz");
    assert_eq!(join_slash(["", "app.tar.bz"]), "app.tar.bz");
    assert_eq!(join_slash(["myrepo", "jars/", "/app.tar.bz"]), "myrepo/jars/app.tar.bz");
    assert_eq!(join_slash(["/abs/", "x"]), "/abs/x");
    assert_eq!(join_slash(["", ""]), "");
}

#[test]
fn join_slash_cleans_dot_segments() {
    assert_eq!(join_slash(["/", "app.tar.bz"]), "/app.tar.bz");
    assert_eq!(join_slash(["./jars", "app.tar.bz"]), "jars/app.tar.bz");
    assert_eq!(join_slash(["myrepo", "./", "app.tar.bz"]), "myrepo/app.tar.bz");
    assert_eq!(join_slash(["a/../b", "x"]), "b/x");
    assert_eq!(join_slash(["myrepo", "jars/..", "app.tar.bz"]), "myrepo/app.tar.bz");
    assert_eq!(join_slash(["..", "x"]), "../x");
    assert_eq!(join_slash(["/..", "x"]), "/x");
    assert_eq!(join_slash(["a", ".."]), ".");
}

proptest! {
    #[test]
    fn project_name_is_last_segment(
        host in "[a-z]{1,10}",
        org in "[a-z0-9-]{1,12}",
        name in "[a-zA-Z0-9_-]{1,20}",
        git_suffix in any::<bool>(),
        trailing_slash in any::<bool>(),
    ) {
        let mut url = format!("https://{host}.example/{org}/{name}");
        if git_suffix {
            url.push_str(".git");
        }
        if trailing_slash {
            url.push('/');
        }
        prop_assert_eq!(project_name_from_url(&url), name);
    }

    #[test]
    fn repo_dir_is_work_dir_joined_with_project(
        name in "[a-z][a-z0-9-]{0,15}",
        cache in any::<bool>(),
    ) {
        let mut vars = base_env();
        vars.insert("GIT_CLONE_URL".to_owned(), format!("https://git.example/org/{name}.git"));
        if cache {
            vars.insert("_WORKFLOW_FLAG_CACHE".to_owned(), "true".to_owned());
        }

        let config = JobConfig::from_env(&vars, &WorkspaceRoots::default()).unwrap();
        prop_assert_eq!(config.repo_dir().to_path_buf(), config.work_dir().join(&name));
        prop_assert_eq!(config.project_name(), name.as_str());
    }
}
