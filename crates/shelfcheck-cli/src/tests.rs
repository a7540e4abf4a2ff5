use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["shelfcheck"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_check_with_defaults() {
    let cli = Cli::try_parse_from([
        "shelfcheck",
        "check",
        "--retailer",
        "trademax",
        "--input",
        "skus.txt",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Check {
            retailer,
            input,
            found_out,
            not_found_out,
            delay_ms,
            dry_run,
        }) => {
            assert_eq!(retailer, "trademax");
            assert_eq!(input, PathBuf::from("skus.txt"));
            assert_eq!(found_out, PathBuf::from("products_found.txt"));
            assert_eq!(not_found_out, PathBuf::from("products_not_found.txt"));
            assert_eq!(delay_ms, None);
            assert!(!dry_run);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_check_with_overrides() {
    let cli = Cli::try_parse_from([
        "shelfcheck",
        "check",
        "--retailer",
        "bygghemma",
        "--input",
        "urls.txt",
        "--found-out",
        "out/found.txt",
        "--not-found-out",
        "out/missing.txt",
        "--delay-ms",
        "1500",
        "--dry-run",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Check {
            delay_ms: Some(1500),
            dry_run: true,
            ref found_out,
            ..
        }) if found_out == &PathBuf::from("out/found.txt")
    ));
}

#[test]
fn check_requires_retailer() {
    let err = Cli::try_parse_from(["shelfcheck", "check", "--input", "skus.txt"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn check_rejects_non_numeric_delay() {
    let result = Cli::try_parse_from([
        "shelfcheck",
        "check",
        "--retailer",
        "trademax",
        "--input",
        "skus.txt",
        "--delay-ms",
        "soon",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_retailers_command() {
    let cli = Cli::try_parse_from(["shelfcheck", "retailers"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Retailers)));
}

#[test]
fn parses_warm_cookies_minimal() {
    let cli = Cli::try_parse_from([
        "shelfcheck",
        "warm-cookies",
        "--ips",
        "ips.txt",
        "--url",
        "https://www.wayfair.de/moebel/pdp/sofa-d110017167.html",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::WarmCookies {
            job_id: None,
            storage_dir: None,
            ..
        })
    ));
}

#[test]
fn parses_warm_cookies_with_job_id_and_storage_dir() {
    let cli = Cli::try_parse_from([
        "shelfcheck",
        "warm-cookies",
        "--ips",
        "ips.txt",
        "--url",
        "https://www.wayfair.de/x.html",
        "--job-id",
        "job_warmup_1",
        "--storage-dir",
        "storage",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::WarmCookies {
            job_id: Some(ref id),
            storage_dir: Some(ref dir),
            ..
        }) if id == "job_warmup_1" && dir == &PathBuf::from("storage")
    ));
}

#[test]
fn parses_import_command() {
    let cli = Cli::try_parse_from([
        "shelfcheck",
        "import",
        "--file",
        "trademax.xlsx",
        "--table",
        "temp_vd_trademax_2024_08_28",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import { ref table, ref file }) if table == "temp_vd_trademax_2024_08_28"
            && file == &PathBuf::from("trademax.xlsx")
    ));
}

#[test]
fn import_accepts_legacy_csv_flag() {
    let cli = Cli::try_parse_from([
        "shelfcheck",
        "import",
        "--csv",
        "homeroom.csv",
        "--table",
        "temp_vd_homeroom",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import { ref file, .. }) if file == &PathBuf::from("homeroom.csv")
    ));
}

#[test]
fn import_requires_table() {
    assert!(Cli::try_parse_from(["shelfcheck", "import", "--file", "a.csv"]).is_err());
}
