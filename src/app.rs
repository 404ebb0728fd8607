use crate::cli::{CameraSelection, Cli, Commands};
use bcexport::config::Config;
use bcexport::engine::{
    self, DriverOptions, ErrorLog, ExportDriver, ExportError, ExportSummary, OutputDirMode,
    RunMode, SystemRunner, TITLE,
};
use bcexport::host::scene::SceneHost;
use bcexport::host::{ExportSelection, Host};
use bcexport::ui::{self, CrosstermKeys, TuiHost};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

pub fn run(cli: Cli, config: Config) {
    match cli.command {
        Commands::Export {
            scene,
            cameras,
            interactive,
            no_save,
        } => handle_export(&scene, cameras, interactive, no_save, &config),
        Commands::Plan {
            scene,
            cameras,
            json,
        } => handle_plan(&scene, cameras, json, &config),
        Commands::DryRun { scene, cameras } => handle_dry_run(&scene, cameras, &config),
        Commands::CheckTool { install_path } => handle_check_tool(install_path, &config),
        Commands::SmokeTest { interval_ms } => handle_smoke_test(interval_ms),
        Commands::InitConfig => handle_init_config(),
    }
}

fn load_scene(path: &Path, config: &Config) -> SceneHost {
    match SceneHost::load(path, config) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn driver_options(mode: RunMode, config: &Config) -> DriverOptions {
    DriverOptions {
        mode,
        executable: config.tool.executable.clone(),
        debug_log: config.debug_log_path(),
    }
}

fn save_scene(host: &mut SceneHost, no_save: bool) {
    if no_save || !host.is_dirty() {
        return;
    }
    if let Err(e) = host.save() {
        eprintln!("Warning: could not save scene: {:#}", e);
    }
}

fn handle_export(
    scene: &Path,
    cameras: Option<CameraSelection>,
    interactive: bool,
    no_save: bool,
    config: &Config,
) {
    let mut host = load_scene(scene, config);

    if interactive {
        let options = driver_options(RunMode::Interactive, config);
        let result = ui::with_terminal(|terminal| {
            let mut tui = TuiHost::new(&mut host, terminal, CrosstermKeys);
            let selection = match cameras {
                Some(cameras) => ExportSelection::from(cameras),
                None => match tui.choose_selection(TITLE)? {
                    Some(selection) => selection,
                    None => return Ok(None),
                },
            };
            let cams = selection.resolve(&tui);
            let summary =
                ExportDriver::new(&mut tui, SystemRunner::quiet(), std::io::sink(), options)
                    .run(&cams)?;
            Ok(Some(summary))
        });

        save_scene(&mut host, no_save);

        match result {
            Ok(Some(summary)) => print_summary(&summary),
            Ok(None) => println!("Export cancelled."),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
        return;
    }

    let selection = ExportSelection::from(cameras.unwrap_or(CameraSelection::Current));
    let cams = selection.resolve(&host);
    let options = driver_options(RunMode::Headless, config);
    let result = ExportDriver::new(&mut host, SystemRunner::new(), std::io::stdout(), options)
        .run(&cams);

    save_scene(&mut host, no_save);

    match result {
        Ok(_) => {}
        Err(ExportError::JobsFailed { message, .. }) => {
            eprintln!("{}", message);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn print_summary(summary: &ExportSummary) {
    println!(
        "Exported {} of {} cameras, {} errors.",
        summary.succeeded(),
        summary.reports.len(),
        summary.errors.len()
    );
    for report in &summary.reports {
        println!("  {}: {}", report.camera, report.outcome.label());
    }
}

fn handle_plan(scene: &Path, cameras: CameraSelection, json: bool, config: &Config) {
    let host = load_scene(scene, config);
    let cams = ExportSelection::from(cameras).resolve(&host);
    let mut errors = ErrorLog::new();
    let plan = engine::plan_export(&host, &cams, &mut errors);

    if json {
        let value = serde_json::json!({
            "plan": plan,
            "errors": errors.entries(),
        });
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    for job in &plan.jobs {
        println!(
            "- {}: frames {}..{} ({} frames, {} steps)",
            job.name, job.start, job.end, job.frames, job.steps
        );
    }
    println!("Total jobs: {}", plan.jobs.len());
    println!("Total steps: {}", plan.total_steps);
    for error in errors.lines() {
        println!("! {}", error);
    }
}

fn handle_dry_run(scene: &Path, cameras: CameraSelection, config: &Config) {
    let host = load_scene(scene, config);
    let cams = ExportSelection::from(cameras).resolve(&host);
    let mut errors = ErrorLog::new();
    let plan = engine::plan_export(&host, &cams, &mut errors);

    let tool = engine::tool_path(&host.install_path(), &config.tool.executable);
    let dir_mode = OutputDirMode::from_preferences(&host);
    let project_path = host.project_path();

    for job in &plan.jobs {
        let Some(source) = job.source_path.as_deref() else {
            println!("# {}: no footage loaded", job.name);
            continue;
        };
        match engine::resolve_target(&dir_mode, source, project_path.as_deref()) {
            Ok(target) => {
                let args = engine::build_bcfile_args(job, source, &target);
                println!("# {}", job.name);
                println!("{}", engine::format_bcfile_cmd(&tool, &args));
                println!(
                    "#   -> {}",
                    engine::bcompress_path(source, &target.target_path).display()
                );
            }
            Err(e) => println!("# {}: {}", job.name, e),
        }
    }

    for error in errors.lines() {
        println!("! {}", error);
    }
}

fn handle_check_tool(install_path: Option<PathBuf>, config: &Config) {
    let Some(install_path) = install_path.or_else(|| config.tool.install_path.clone()) else {
        eprintln!("Error: no install path given and none configured ([tool] install_path)");
        process::exit(1);
    };

    match engine::tool::check_tool(&install_path, &config.tool.executable) {
        Ok(path) => {
            println!("{} found: {}", config.tool.executable, path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn handle_smoke_test(interval_ms: u64) {
    let interval = Duration::from_millis(interval_ms.max(1));
    let result = ui::with_terminal(|terminal| {
        Ok(ui::run_timer_smoke(terminal, &mut CrosstermKeys, interval)?)
    });

    match result {
        Ok(ticks) => println!("Timer smoke test finished after {} ticks.", ticks),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_init_config() {
    match Config::config_path() {
        Ok(path) if path.exists() => match Config::load_from(&path) {
            Ok(cfg) => {
                println!("Config loaded successfully from {}", path.display());
                println!("{:#?}", cfg);
            }
            Err(e) => {
                println!("Config invalid: {:#}", e);
                println!("Fix or remove the file to regenerate defaults.");
                process::exit(1);
            }
        },
        Ok(path) => {
            if let Err(e) = Config::ensure_default() {
                eprintln!("Failed to save default config: {:#}", e);
                process::exit(1);
            }
            println!("Default config saved to {}", path.display());
        }
        Err(e) => {
            eprintln!("Config path unknown: {:#}", e);
            process::exit(1);
        }
    }
}
