//! Aetherboard application shell.
//!
//! A headless host for the whiteboard session: it loads saved scenes,
//! restores the user's preferences, and writes exports to disk.

use aetherboard_core::{
    Command, ExportError, ExportFormat, FileStorage, ImportError, MemoryStorage, PreferenceStorage, Scene,
    SceneError, SessionEvent, StorageError, ToastKind, Whiteboard, WhiteboardPreferences, WorkspaceAction,
    WorkspaceStore,
};
use aetherboard_render::{PngExporter, RendererError, minimap_display_list, rasterize};
use clap::{Parser, Subcommand, ValueEnum};
use kurbo::Size;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// File name of the rendered minimap.
pub const MINIMAP_FILE_NAME: &str = "minimap.png";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to create {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("the minimap is turned off in preferences")]
    MinimapHidden,
    #[error("the canvas is locked")]
    Locked,
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Parser)]
#[command(name = "aetherboard")]
#[command(about = "Aetherboard whiteboard: export scenes, import images, manage preferences")]
pub struct Cli {
    /// Directory holding saved preferences (defaults to the user data dir).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Ignore saved preferences and use the defaults.
    #[arg(long, global = true, default_value_t = false)]
    pub no_prefs: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export a scene as PNG, SVG or JSON.
    Export {
        scene: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Png)]
        format: FormatArg,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Zoom so every object is visible before exporting.
        #[arg(long, default_value_t = false)]
        fit: bool,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
    },
    /// Render the minimap of a scene.
    Minimap {
        scene: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Add an image to a scene and save it as JSON.
    Import {
        image: PathBuf,
        /// Scene to add the image to; a new scene is started if omitted.
        #[arg(long)]
        scene: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Show or change the stored whiteboard preferences.
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    Show,
    Set {
        #[arg(long)]
        grid_size: Option<f64>,
        #[arg(long)]
        show_grid: Option<bool>,
        #[arg(long)]
        snap_to_grid: Option<bool>,
        #[arg(long)]
        show_minimap: Option<bool>,
        #[arg(long)]
        dark_canvas: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Png,
    Svg,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Svg => ExportFormat::Svg,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

/// Run one command. Returns the path written, if any.
pub fn run(cli: Cli) -> AppResult<Option<PathBuf>> {
    let mut store = open_store(cli.data_dir.as_deref(), cli.no_prefs)?;
    match cli.command {
        Commands::Export {
            scene,
            format,
            out_dir,
            fit,
            width,
            height,
        } => {
            let mut board = open_board(&store, Some(scene.as_path()), Size::new(width, height))?;
            if fit {
                board.execute(Command::FitToScreen);
            }
            let result = board.export(format.into(), Some(&PngExporter));
            report_events(&mut board);
            let file = result?;
            let path = out_dir.join(&file.file_name);
            write_file(&path, &file.bytes)?;
            Ok(Some(path))
        }
        Commands::Minimap { scene, out_dir } => {
            let board = open_board(&store, Some(scene.as_path()), Size::new(800.0, 600.0))?;
            let layout = board.minimap_layout().ok_or(AppError::MinimapHidden)?;
            let png = rasterize(&minimap_display_list(&layout)).encode_png()?;
            let path = out_dir.join(MINIMAP_FILE_NAME);
            write_file(&path, &png)?;
            Ok(Some(path))
        }
        Commands::Import { image, scene, output } => {
            let mut board = open_board(&store, scene.as_deref(), Size::new(800.0, 600.0))?;
            let bytes = read_file(&image)?;
            let result = board.import_image(&bytes);
            report_events(&mut board);
            result?.ok_or(AppError::Locked)?;
            let json = board.scene().to_json_pretty()?;
            write_file(&output, json.as_bytes())?;
            Ok(Some(output))
        }
        Commands::Prefs { command } => {
            if let PrefsCommand::Set {
                grid_size,
                show_grid,
                snap_to_grid,
                show_minimap,
                dark_canvas,
            } = command
            {
                let current = store.state().whiteboard.clone();
                let prefs = WhiteboardPreferences {
                    grid_size: grid_size.unwrap_or(current.grid_size),
                    show_grid: show_grid.unwrap_or(current.show_grid),
                    snap_to_grid: snap_to_grid.unwrap_or(current.snap_to_grid),
                    show_minimap: show_minimap.unwrap_or(current.show_minimap),
                    dark_canvas: dark_canvas.unwrap_or(current.dark_canvas),
                };
                store.dispatch(WorkspaceAction::SetWhiteboardPreferences(prefs));
            }
            let json = serde_json::to_string_pretty(&store.state().whiteboard).map_err(SceneError::Serialize)?;
            println!("{}", json);
            Ok(None)
        }
    }
}

/// Open the workspace store, persisting to `data_dir` or the user data dir.
pub fn open_store(data_dir: Option<&Path>, no_prefs: bool) -> AppResult<WorkspaceStore> {
    let storage: Arc<dyn PreferenceStorage> = if no_prefs {
        Arc::new(MemoryStorage::new())
    } else {
        match data_dir {
            Some(dir) => Arc::new(FileStorage::new(dir.to_path_buf())?),
            None => Arc::new(FileStorage::default_location()?),
        }
    };
    Ok(WorkspaceStore::with_storage(storage)?)
}

/// Start a session with the stored preferences, optionally loading a scene.
pub fn open_board(store: &WorkspaceStore, scene: Option<&Path>, viewport_size: Size) -> AppResult<Whiteboard> {
    let config = store.state().whiteboard_config().with_viewport_size(viewport_size);
    let mut board = Whiteboard::new(config);
    if let Some(path) = scene {
        let json = String::from_utf8_lossy(&read_file(path)?).into_owned();
        board.load_scene(Scene::from_json(&json)?);
        info!("loaded {} objects from {}", board.scene().len(), path.display());
    }
    Ok(board)
}

fn report_events(board: &mut Whiteboard) {
    for event in board.drain_events() {
        if let SessionEvent::Toast { kind, message } = event {
            match kind {
                ToastKind::Success | ToastKind::Info => info!("{}", message),
                ToastKind::Error => error!("{}", message),
            }
        }
    }
}

fn read_file(path: &Path) -> AppResult<Vec<u8>> {
    fs::read(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty() && !p.exists()) {
        fs::create_dir_all(parent).map_err(|source| AppError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aetherboard_core::CanvasTheme;
    use aetherboard_core::shapes::{Rectangle, Shape, ShapeKind};
    use kurbo::Point;
    use std::io::Cursor;

    fn cli(data_dir: &Path, command: Commands) -> Cli {
        Cli {
            data_dir: Some(data_dir.to_path_buf()),
            no_prefs: false,
            command,
        }
    }

    fn write_scene(dir: &Path) -> PathBuf {
        let mut scene = Scene::default();
        scene.add(Shape::new(Rectangle::new(Point::new(50.0, 50.0), 200.0, 100.0)));
        let path = dir.join("scene.json");
        fs::write(&path, scene.to_json().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_parse_export_args() {
        let cli = Cli::try_parse_from(["aetherboard", "export", "board.json", "--format", "svg", "--fit"]).unwrap();
        match cli.command {
            Commands::Export { scene, format, fit, .. } => {
                assert_eq!(scene, PathBuf::from("board.json"));
                assert_eq!(format, FormatArg::Svg);
                assert!(fit);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_export_json_round_trips_scene() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = write_scene(dir.path());
        let out = dir.path().join("out");
        let written = run(cli(
            dir.path(),
            Commands::Export {
                scene: scene_path,
                format: FormatArg::Json,
                out_dir: out.clone(),
                fit: false,
                width: 800.0,
                height: 600.0,
            },
        ))
        .unwrap();
        assert_eq!(written, Some(out.join("whiteboard.json")));
        let exported = Scene::from_json(&fs::read_to_string(out.join("whiteboard.json")).unwrap()).unwrap();
        assert_eq!(exported.len(), 1);
    }

    #[test]
    fn test_export_png_is_double_density() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = write_scene(dir.path());
        run(cli(
            dir.path(),
            Commands::Export {
                scene: scene_path,
                format: FormatArg::Png,
                out_dir: dir.path().to_path_buf(),
                fit: false,
                width: 400.0,
                height: 300.0,
            },
        ))
        .unwrap();
        let png = image::open(dir.path().join("whiteboard.png")).unwrap();
        assert_eq!((png.width(), png.height()), (800, 600));
    }

    #[test]
    fn test_export_rejects_bad_scene() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = dir.path().join("broken.json");
        fs::write(&scene_path, "{ not json").unwrap();
        let result = run(cli(
            dir.path(),
            Commands::Export {
                scene: scene_path,
                format: FormatArg::Svg,
                out_dir: dir.path().to_path_buf(),
                fit: false,
                width: 800.0,
                height: 600.0,
            },
        ));
        assert!(matches!(result, Err(AppError::Scene(_))));
        assert!(!dir.path().join("whiteboard.svg").exists());
    }

    #[test]
    fn test_export_reports_uncreatable_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = write_scene(dir.path());
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let result = run(cli(
            dir.path(),
            Commands::Export {
                scene: scene_path,
                format: FormatArg::Json,
                out_dir: blocker.join("exports"),
                fit: false,
                width: 800.0,
                height: 600.0,
            },
        ));
        match result {
            Err(AppError::CreateDir { path, .. }) => assert_eq!(path, blocker.join("exports")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_stored_theme_overrides_scene_background() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = write_scene(dir.path());
        let mut store = open_store(Some(dir.path()), false).unwrap();
        let prefs = WhiteboardPreferences {
            dark_canvas: true,
            ..store.state().whiteboard.clone()
        };
        store.dispatch(WorkspaceAction::SetWhiteboardPreferences(prefs));

        let board = open_board(&store, Some(scene_path.as_path()), Size::new(800.0, 600.0)).unwrap();
        assert_eq!(board.scene().background, CanvasTheme::Dark.background());
        assert_eq!(board.scene().len(), 1);
    }

    #[test]
    fn test_import_adds_image_to_scene() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("photo.png");
        let buffer = image::RgbaImage::from_pixel(40, 20, image::Rgba([0, 120, 200, 255]));
        let mut bytes = Cursor::new(Vec::new());
        buffer.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        fs::write(&image_path, bytes.into_inner()).unwrap();

        let scene_path = write_scene(dir.path());
        let output = dir.path().join("with-image.json");
        run(cli(
            dir.path(),
            Commands::Import {
                image: image_path,
                scene: Some(scene_path),
                output: output.clone(),
            },
        ))
        .unwrap();
        let scene = Scene::from_json(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(scene.len(), 2);
        assert!(matches!(scene.objects()[1].kind, ShapeKind::Image(_)));
    }

    #[test]
    fn test_prefs_persist_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        run(cli(
            dir.path(),
            Commands::Prefs {
                command: PrefsCommand::Set {
                    grid_size: Some(40.0),
                    show_grid: None,
                    snap_to_grid: Some(true),
                    show_minimap: None,
                    dark_canvas: Some(true),
                },
            },
        ))
        .unwrap();

        let store = open_store(Some(dir.path()), false).unwrap();
        let prefs = &store.state().whiteboard;
        assert_eq!(prefs.grid_size, 40.0);
        assert!(prefs.snap_to_grid);
        assert!(prefs.dark_canvas);
        assert!(prefs.show_grid);

        let board = open_board(&store, None, Size::new(800.0, 600.0)).unwrap();
        assert!(board.config().theme.is_dark());
        assert!(board.config().snap_to_grid);
    }

    #[test]
    fn test_minimap_respects_preference() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = write_scene(dir.path());
        let written = run(cli(
            dir.path(),
            Commands::Minimap {
                scene: scene_path.clone(),
                out_dir: dir.path().to_path_buf(),
            },
        ))
        .unwrap();
        assert_eq!(written, Some(dir.path().join(MINIMAP_FILE_NAME)));

        let mut store = open_store(Some(dir.path()), false).unwrap();
        let prefs = WhiteboardPreferences {
            show_minimap: false,
            ..store.state().whiteboard.clone()
        };
        store.dispatch(WorkspaceAction::SetWhiteboardPreferences(prefs));
        let result = run(cli(
            dir.path(),
            Commands::Minimap {
                scene: scene_path,
                out_dir: dir.path().to_path_buf(),
            },
        ));
        assert!(matches!(result, Err(AppError::MinimapHidden)));
    }
}
