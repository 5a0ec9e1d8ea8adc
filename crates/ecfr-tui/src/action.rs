/// User intents produced by the input layer and consumed by `App::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    GoTop,
    GoBottom,
    PageUp,
    PageDown,
    /// Start acquisition for the row under the cursor.
    Download,
    /// Select the row under the cursor for charting.
    ShowCharts,
    /// Clear the selection.
    ClearSelection,
    ToggleHelp,
    Resize(u16, u16),
    Tick,
    None,
}
