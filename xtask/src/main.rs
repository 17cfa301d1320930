use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the topology workspace",
    long_about = "A unified CLI for running CI checks, the sample topology\n\
                  example, and Lambda artifact packaging."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize and print the sample application topology
    Topology,
    /// Run CI checks (fmt, clippy, tests, example)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the Lambda binaries as zip artifacts
    LambdaPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run the topology example
    Examples,
    /// Run check + examples
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_lambdas(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build Lambda binaries");
    let mut cargo_args = vec![
        "build",
        "-p",
        "topo_lambda",
        "--target",
        target,
        "--bin",
        "echo_lambda",
        "--bin",
        "ses_lambda",
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package Lambda zip artifacts");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new("dist");
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    for bin_name in ["echo_lambda", "ses_lambda"] {
        let zip_path = dist_dir.join(format!("{bin_name}.zip"));
        package_lambda_zip(&target_dir.join(bin_name), &zip_path);
        eprintln!("Packaged artifact: {}", zip_path.display());
    }
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- lambda-package`"
        );
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test topo_core");
    run_cargo(&["test", "-p", "topo_core"]);

    step("Test topo_lambda");
    run_cargo(&["test", "-p", "topo_lambda"]);
}

fn ci_examples() {
    step("Run define_topology example");
    run_cargo(&["run", "-p", "topo_core", "--example", "define_topology"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Topology => {
            run_cargo(&["run", "-p", "topo_core", "--example", "define_topology"]);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::LambdaPackage { target, profile } => {
            package_lambdas(&target, profile);
        }
    }
}
