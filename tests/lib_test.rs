//! Library integration tests.

use kickoff::KickoffError;

#[test]
fn error_types_are_public() {
    let err = KickoffError::RegistryChanged {
        recorded: "aaaa".into(),
        current: "bbbb".into(),
    };
    assert!(err.to_string().contains("kickoff reset"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> kickoff::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use kickoff::cli::{Cli, Commands};

    let cli = Cli::parse_from(["kickoff", "status", "--json"]);
    assert!(cli.command.is_some());

    if let Some(Commands::Status(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Status command");
    }
}

#[test]
fn collaborators_are_swappable() {
    use kickoff::site::{MemorySite, Site};
    use kickoff::state::{MemoryProgressStore, ProgressStore};
    use std::sync::Arc;

    let site: Arc<dyn Site> = Arc::new(MemorySite::new());
    let store: Arc<dyn ProgressStore> = Arc::new(MemoryProgressStore::new());

    assert!(site.prepare().is_ok());
    assert!(store.load().unwrap().is_fresh());
}
