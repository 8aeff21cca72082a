//! Aetherboard Core Library
//!
//! Platform-agnostic scene model, tools and session logic for the Aetherboard
//! whiteboard. Rendering lives in `aetherboard-render`.

pub mod config;
pub mod export;
pub mod grid;
pub mod history;
pub mod import;
pub mod input;
pub mod minimap;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod shortcuts;
pub mod snap;
pub mod storage;
pub mod store;
pub mod text_edit;
pub mod tools;
pub mod viewport;
pub mod whiteboard;

pub use config::{CanvasTheme, WhiteboardConfig, WhiteboardPreferences};
pub use export::{ExportError, ExportFile, ExportFormat, RasterExporter};
pub use grid::GridLayout;
pub use history::History;
pub use import::ImportError;
pub use input::{InputFocus, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use minimap::MinimapLayout;
pub use scene::{Scene, SceneError};
pub use selection::Selection;
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeKind, ShapeStyle};
pub use shortcuts::{Alignment, Command, ShortcutDispatcher, ShortcutRegistry};
pub use snap::{GRID_SIZE, snap_to_grid};
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage, StorageError, StorageResult};
pub use store::{Theme, WorkspaceAction, WorkspaceState, WorkspaceStore};
pub use text_edit::{TextEditResult, TextEditState};
pub use tools::{DrawStyle, ToolKind, ToolManager, ToolState};
pub use viewport::Viewport;
pub use whiteboard::{CursorIcon, SessionEvent, ToastKind, Whiteboard};
