use anyhow::Result;
use clap::{Parser, Subcommand};
use xshell::{cmd, Shell};

const VALID_PLATFORMS: [&str; 4] = ["mac", "win", "linux", "all"];

#[derive(Parser)]
#[command(name = "xtask", about = "BrandBay desktop task automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build installers for a target platform (mac, win, linux, all)
    Build {
        /// Target platform; defaults to the host platform
        platform: Option<String>,
    },
    /// Run the shell in development mode
    Dev,
    /// Run the workspace tests
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildPlatform {
    Mac,
    Win,
    Linux,
    All,
}

impl BuildPlatform {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim() {
            "mac" => Ok(Self::Mac),
            "win" => Ok(Self::Win),
            "linux" => Ok(Self::Linux),
            "all" => Ok(Self::All),
            other => Err(format!(
                "Invalid platform: {other}. Valid options are: {}",
                VALID_PLATFORMS.join(", ")
            )),
        }
    }

    fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(target_os = "windows") {
            Self::Win
        } else {
            Self::Linux
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Mac => "mac",
            Self::Win => "win",
            Self::Linux => "linux",
            Self::All => "all",
        }
    }

    /// Extra arguments handed to `cargo tauri build`.
    fn bundle_args(self) -> Vec<String> {
        let bundles = match self {
            Self::Mac => "app,dmg",
            Self::Win => "nsis,msi",
            Self::Linux => "deb,appimage",
            Self::All => return Vec::new(),
        };
        vec!["--bundles".to_string(), bundles.to_string()]
    }

    fn needs_notarization(self) -> bool {
        matches!(self, Self::Mac | Self::All) && cfg!(target_os = "macos")
    }
}

fn resolve_platform(raw: Option<&str>) -> Result<BuildPlatform, String> {
    match raw {
        Some(value) => BuildPlatform::parse(value),
        None => Ok(BuildPlatform::host()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    let project_root = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .ok()
        .and_then(|path| path.parent().map(|parent| parent.to_path_buf()))
        .map(Ok)
        .unwrap_or_else(std::env::current_dir)?;
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build { platform } => {
            let platform = match resolve_platform(platform.as_deref()) {
                Ok(platform) => platform,
                Err(message) => {
                    eprintln!("{message}");
                    std::process::exit(1);
                }
            };
            build(&sh, platform)?
        }
        Commands::Dev => dev(&sh)?,
        Commands::Test => test(&sh)?,
    }

    Ok(())
}

fn build(sh: &Shell, platform: BuildPlatform) -> Result<()> {
    println!("Building for platform: {}", platform.name());

    let assets_dir = sh.current_dir().join("src-tauri").join("assets");
    sh.create_dir(&assets_dir)?;

    let args = platform.bundle_args();
    let rendered_args = args.join(" ");
    let mut command = cmd!(sh, "cargo tauri build {args...}");
    if platform.needs_notarization() {
        // cargo-tauri reads the app-specific password as APPLE_PASSWORD.
        if let Ok(password) = std::env::var("APPLE_APP_SPECIFIC_PASSWORD") {
            command = command.env("APPLE_PASSWORD", password);
        }
        for key in ["APPLE_ID", "APPLE_TEAM_ID"] {
            if std::env::var_os(key).is_none() {
                println!("{key} is not set; the bundle will not be notarized");
            }
        }
    }

    println!("Executing: cargo tauri build {rendered_args}");
    command.run()?;
    println!("Build completed successfully!");
    Ok(())
}

fn dev(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo tauri dev").run()?;
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo test --workspace").run()?;
    Ok(())
}
