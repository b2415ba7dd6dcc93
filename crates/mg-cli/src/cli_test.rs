use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_parse_export_and_globals() {
    let cli = Cli::try_parse_from(["mg", "-r", "migrations", "export", "auth", "-o", "dist"]).unwrap();
    assert_eq!(cli.global.root, PathBuf::from("migrations"));
    match cli.command {
        Commands::Export(args) => {
            assert_eq!(args.selector, "auth");
            assert_eq!(args.output_dir, Some(PathBuf::from("dist")));
        }
        other => panic!("expected export, got {other:?}"),
    }
}

#[test]
fn test_parse_import_flags() {
    let cli = Cli::try_parse_from([
        "mg",
        "import",
        "010_auth",
        "010_auth.tar.gz",
        "--overwrite",
        "--no-merge-config",
    ])
    .unwrap();
    match cli.command {
        Commands::Import(args) => {
            assert_eq!(args.module, "010_auth");
            assert!(args.overwrite);
            assert!(args.no_merge_config);
        }
        other => panic!("expected import, got {other:?}"),
    }
}

#[test]
fn test_lint_format_defaults_to_text() {
    let cli = Cli::try_parse_from(["mg", "lint"]).unwrap();
    match cli.command {
        Commands::Lint(args) => assert_eq!(args.format, LintFormat::Text),
        other => panic!("expected lint, got {other:?}"),
    }
}

#[test]
fn test_parse_new_with_create_module() {
    let cli = Cli::try_parse_from(["mg", "new", "030_billing", "invoices", "--create-module"]).unwrap();
    match cli.command {
        Commands::New(args) => {
            assert_eq!(args.module, "030_billing");
            assert_eq!(args.name, "invoices");
            assert!(args.create_module);
        }
        other => panic!("expected new, got {other:?}"),
    }
}
