use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 19] = [
        "RUST_LOG",
        "SF_HOST",
        "SF_PORT",
        "SF_DATABASE_URL",
        "SF_JWT_ALGORITHM",
        "SF_ACCESS_TOKEN_EXPIRE_MINUTES",
        "SF_CATALOG_CACHE_TTL_SECS",
        "SF_STOCK_SWEEP_INTERVAL_SECS",
        "SF_USE_X_FORWARDED_FOR",
        "SF_USE_FORWARDED",
        "SF_PAYFAST_IP_WHITELIST",
        "SF_PAYFAST_MERCHANT_ID",
        "SF_PAYFAST_SANDBOX",
        "SF_PAYFAST_BASE_URL",
        "SF_PAYFAST_RETURN_URL",
        "SF_PAYFAST_CANCEL_URL",
        "SF_PAYFAST_NOTIFY_URL",
        "SF_PAYFAST_VALIDATION_TIMEOUT_SECS",
        "SF_PAYFAST_VALIDATION_RETRIES",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
