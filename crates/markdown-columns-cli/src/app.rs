use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use markdown_columns_config::ColumnSettings;
use markdown_columns_engine::{
    BlockSession, Document, LinkIndex, Navigator, NoteIndex, Position, RenderOptions, WriteResult,
    io, links,
};
use ratatui::layout::Rect;
use relative_path::{RelativePath, RelativePathBuf};
use std::path::PathBuf;
use std::time::Instant;

/// Terminal cells are treated as this many pixels wide, so the engine's
/// pixel-based minimum column width maps onto the grid.
pub const CELL_WIDTH_PX: f64 = 8.0;

/// Keyboard resize step, in percentage points.
const RESIZE_STEP: f64 = 5.0;

const SHOWN_COMPLETIONS: usize = 5;

/// Collects the notes a followed link may refer to, most specific first.
#[derive(Default)]
struct LinkTargets(Vec<RelativePathBuf>);

impl Navigator for LinkTargets {
    fn resolve_and_navigate(&mut self, target: &str, context_path: &RelativePath, _new_pane: bool) {
        let file = format!("{target}.md");
        if let Some(dir) = context_path.parent() {
            self.0.push(dir.join(&file));
        }
        self.0.push(RelativePathBuf::from(file));
    }
}

pub struct App {
    pub notes_root: PathBuf,
    pub file: RelativePathBuf,
    pub settings: ColumnSettings,
    pub document: Document,
    pub blocks: Vec<BlockSession>,
    pub selected_block: usize,
    pub focused_column: usize,
    pub completions: Vec<String>,
    pub status: String,
    /// Where the selected block was last drawn.
    pub block_area: Option<Rect>,
    link_index: NoteIndex,
    track_width_px: f64,
}

impl App {
    pub fn open(notes_root: PathBuf, file: RelativePathBuf, settings: ColumnSettings) -> Result<Self> {
        let link_index = NoteIndex::scan(&notes_root).unwrap_or_else(|e| {
            log::warn!("link completion disabled: {e}");
            NoteIndex::default()
        });

        let mut app = Self {
            notes_root,
            file,
            settings,
            document: Document::from_bytes(b"")?,
            blocks: Vec::new(),
            selected_block: 0,
            focused_column: 0,
            completions: Vec::new(),
            status: String::new(),
            block_area: None,
            link_index,
            track_width_px: 80.0 * CELL_WIDTH_PX,
        };
        app.load_file()?;
        Ok(app)
    }

    fn options(&self) -> RenderOptions {
        RenderOptions::new(
            self.settings.show_column_borders,
            self.settings.button_size_scale,
        )
    }

    fn load_file(&mut self) -> Result<()> {
        let content = io::read_file(&self.file, &self.notes_root)?;
        self.document = Document::from_bytes(content.as_bytes())?;
        self.selected_block = 0;
        self.focused_column = 0;
        self.reload_blocks()?;
        self.status = format!("{} column block(s)", self.blocks.len());
        Ok(())
    }

    /// Re-read every block from the document, discarding session state.
    fn reload_blocks(&mut self) -> Result<()> {
        let options = self.options();
        self.blocks = self
            .document
            .column_blocks()?
            .iter()
            .map(|site| BlockSession::open(site, options, self.track_width_px))
            .collect();
        self.selected_block = self
            .selected_block
            .min(self.blocks.len().saturating_sub(1));
        self.clamp_focus();
        Ok(())
    }

    fn clamp_focus(&mut self) {
        let count = self
            .current()
            .map(|b| b.instance().column_count())
            .unwrap_or(1);
        self.focused_column = self.focused_column.min(count.saturating_sub(1));
    }

    pub fn current(&self) -> Option<&BlockSession> {
        self.blocks.get(self.selected_block)
    }

    fn current_mut(&mut self) -> Option<&mut BlockSession> {
        self.blocks.get_mut(self.selected_block)
    }

    pub fn is_editing(&self) -> bool {
        self.current().is_some_and(|b| b.edit().is_some())
    }

    fn is_quiet(&self) -> bool {
        self.blocks
            .iter()
            .all(|b| !b.has_pending_work() && b.edit().is_none() && b.engine().is_idle())
    }

    pub fn set_track_cells(&mut self, cells: u16) {
        self.track_width_px = f64::from(cells) * CELL_WIDTH_PX;
        for block in &mut self.blocks {
            block.set_track_width(self.track_width_px);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.blocks.iter().filter_map(BlockSession::next_deadline).min()
    }

    // Time

    /// Run due writes; save and re-read the document when anything landed.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        let mut results = Vec::new();
        for block in &mut self.blocks {
            results.extend(block.tick(&mut self.document, now));
        }
        self.after_writes(&results)
    }

    /// Run every pending write now.
    pub fn flush(&mut self, now: Instant) -> Result<()> {
        let mut results = Vec::new();
        for block in &mut self.blocks {
            results.extend(block.flush(&mut self.document, now));
        }
        self.after_writes(&results)
    }

    fn after_writes(&mut self, results: &[WriteResult]) -> Result<()> {
        if results.is_empty() {
            return Ok(());
        }
        if results
            .iter()
            .any(|r| matches!(r, WriteResult::Written { .. }))
        {
            io::write_file(&self.file, &self.notes_root, &self.document.text())?;
            self.status = format!("saved {}", self.file);
        }
        if results
            .iter()
            .any(|r| matches!(r, WriteResult::Dropped(_)))
        {
            self.status = "block changed in the document; change not written".to_string();
        }
        if self.is_quiet() {
            self.reload_blocks()?;
        }
        Ok(())
    }

    // Input

    /// Handle a key press. Returns `true` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<bool> {
        if self.is_editing() {
            self.handle_edit_key(key, now);
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.flush(now)?;
                return Ok(true);
            }
            KeyCode::Tab => self.select_block(1),
            KeyCode::BackTab => self.select_block(-1),
            KeyCode::Left | KeyCode::Char('h') => {
                self.focused_column = self.focused_column.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.focused_column += 1;
                self.clamp_focus();
            }
            KeyCode::Char('a') => self.add_column(Position::After, now),
            KeyCode::Char('i') => self.add_column(Position::Before, now),
            KeyCode::Char('x') => self.remove_column(now),
            KeyCode::Char('H') => self.move_column(-1, now),
            KeyCode::Char('L') => self.move_column(1, now),
            KeyCode::Char('<') => self.nudge_divider(-RESIZE_STEP, now),
            KeyCode::Char('>') => self.nudge_divider(RESIZE_STEP, now),
            KeyCode::Char('e') | KeyCode::Enter => self.start_edit(),
            KeyCode::Char('o') => self.follow_first_link(now)?,
            KeyCode::Char('b') => self.insert_block(now)?,
            _ => {}
        }
        Ok(false)
    }

    fn select_block(&mut self, step: isize) {
        if self.blocks.is_empty() {
            return;
        }
        let count = self.blocks.len() as isize;
        self.selected_block = (self.selected_block as isize + step).rem_euclid(count) as usize;
        self.focused_column = 0;
    }

    fn add_column(&mut self, position: Position, now: Instant) {
        let at = self.focused_column;
        let Some(block) = self.current_mut() else {
            return;
        };
        if block.add_column(at, position, now).needs_write_back() && position == Position::After {
            self.focused_column += 1;
        }
    }

    fn remove_column(&mut self, now: Instant) {
        let at = self.focused_column;
        let Some(block) = self.current_mut() else {
            return;
        };
        if !block.remove_column(at, now).needs_write_back() {
            self.status = "a block needs at least one column".to_string();
        }
        self.clamp_focus();
    }

    fn move_column(&mut self, step: isize, now: Instant) {
        let from = self.focused_column;
        let Some(to) = from.checked_add_signed(step) else {
            return;
        };
        let Some(block) = self.current_mut() else {
            return;
        };
        if to >= block.instance().column_count() || !block.begin_reorder(from) {
            return;
        }
        block.drag_enter(to);
        let moved = block.drop_on(to, now).needs_write_back();
        block.drag_end();
        if moved {
            self.focused_column = to;
        }
    }

    /// Drag the divider right of the focused column (left of the last one)
    /// by `step` percent of the track.
    fn nudge_divider(&mut self, step: f64, now: Instant) {
        let focused = self.focused_column;
        let Some(block) = self.current_mut() else {
            return;
        };
        let count = block.instance().column_count();
        if count < 2 {
            return;
        }
        let divider = focused.min(count - 2);
        let Some(&x) = block.view().dividers.get(divider) else {
            return;
        };
        let track = block.view().track_width_px;
        if block.begin_resize(divider, x) {
            block.resize_move(x + track * step / 100.0);
            block.end_resize(now);
        }
    }

    fn start_edit(&mut self) {
        let column = self.focused_column;
        if let Some(block) = self.current_mut()
            && block.start_edit(column)
        {
            self.status = "editing: Ctrl-S save, Esc cancel, Tab complete link".to_string();
        }
        self.update_completions();
    }

    fn handle_edit_key(&mut self, key: KeyEvent, now: Instant) {
        let first_completion = self.completions.first().cloned();
        let Some(block) = self.blocks.get_mut(self.selected_block) else {
            return;
        };

        let mut changed = false;
        match key.code {
            KeyCode::Esc => {
                block.cancel_edit(now);
                self.status = "edit cancelled".to_string();
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                block.save_edit(now);
                self.status = "edit saved".to_string();
            }
            _ => {
                let Some(edit) = block.edit_mut() else {
                    return;
                };
                match key.code {
                    KeyCode::Tab => {
                        if let Some(name) = first_completion {
                            changed = edit.accept_completion(&name);
                        }
                    }
                    KeyCode::Enter => {
                        edit.insert_char('\n');
                        changed = true;
                    }
                    KeyCode::Backspace => changed = edit.backspace(),
                    KeyCode::Left => edit.move_left(),
                    KeyCode::Right => edit.move_right(),
                    KeyCode::Char(c) => {
                        edit.insert_char(c);
                        changed = true;
                    }
                    _ => {}
                }
            }
        }

        if changed {
            block.note_edit(now);
        }
        self.update_completions();
    }

    fn update_completions(&mut self) {
        let query = self
            .current()
            .and_then(|b| b.edit())
            .and_then(|e| e.completion_query());
        self.completions = match query {
            Some(q) => {
                let mut names = self.link_index.list_candidate_link_targets(&q.query);
                names.truncate(SHOWN_COMPLETIONS);
                names
            }
            None => Vec::new(),
        };
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let Some(area) = self.block_area else {
            return;
        };
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;
        let x = f64::from(mouse.column.saturating_sub(area.x)) * CELL_WIDTH_PX;
        let editing = self.is_editing();

        let Some(block) = self.blocks.get_mut(self.selected_block) else {
            return;
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside && !editing => {
                if let Some(divider) = block.view().divider_at(x, CELL_WIDTH_PX) {
                    block.begin_resize(divider, x);
                } else if let Some(column) = block.view().column_at(x) {
                    self.focused_column = column;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                block.resize_move(x);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                block.end_resize(now);
            }
            _ => {}
        }
    }

    // Document level

    fn insert_block(&mut self, now: Instant) -> Result<()> {
        self.flush(now)?;
        let end = self.document.len();
        self.document.set_cursor(end);
        self.document
            .insert_block_at_cursor(self.settings.default_column_count);
        io::write_file(&self.file, &self.notes_root, &self.document.text())?;

        self.reload_blocks()?;
        self.selected_block = self.blocks.len().saturating_sub(1);
        self.focused_column = 0;
        self.status = "inserted column block".to_string();
        Ok(())
    }

    fn follow_first_link(&mut self, now: Instant) -> Result<()> {
        let Some(text) = self
            .current()
            .and_then(|b| b.instance().column(self.focused_column))
            .map(str::to_string)
        else {
            return Ok(());
        };
        let Some(link) = links::wikilinks(&text).into_iter().next() else {
            self.status = "no link in this column".to_string();
            return Ok(());
        };

        let mut targets = LinkTargets::default();
        links::follow_link(&mut targets, &text, link.span.start, &self.file, false);

        let Some(found) = targets
            .0
            .into_iter()
            .find(|path| path.to_path(&self.notes_root).is_file())
        else {
            self.status = format!("no note named {}", link.target);
            return Ok(());
        };

        self.flush(now)?;
        self.file = found;
        self.load_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLAN: &str = "# Plan\n\n```columns\ncolumns: 2\n===column===\nsee [[Other]]\n===column===\nB\n```\n";

    fn app_with(files: &[(&str, &str)]) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let app = App::open(
            dir.path().to_path_buf(),
            RelativePathBuf::from("plan.md"),
            ColumnSettings::default(),
        )
        .unwrap();
        (dir, app)
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now)
            .unwrap()
    }

    fn on_disk(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("plan.md")).unwrap()
    }

    #[test]
    fn configured_button_scale_is_clamped_for_rendering() {
        let (_dir, mut app) = app_with(&[("plan.md", PLAN)]);
        app.settings.button_size_scale = 5.0;
        assert_eq!(
            app.options().button_size_scale,
            markdown_columns_engine::render::MAX_BUTTON_SCALE
        );
    }

    #[test]
    fn add_column_is_saved_after_tick() {
        let (dir, mut app) = app_with(&[("plan.md", PLAN)]);
        let t0 = Instant::now();

        press(&mut app, KeyCode::Char('a'), t0);
        assert_eq!(app.focused_column, 1);
        assert_eq!(on_disk(&dir), PLAN);

        app.tick(t0 + markdown_columns_engine::sync::WRITE_DELAY)
            .unwrap();
        assert!(on_disk(&dir).contains("columns: 3\n"));
        assert_eq!(app.blocks[0].instance().column_count(), 3);
    }

    #[test]
    fn quit_flushes_pending_writes() {
        let (dir, mut app) = app_with(&[("plan.md", PLAN)]);
        let t0 = Instant::now();

        press(&mut app, KeyCode::Char('L'), t0);
        assert!(press(&mut app, KeyCode::Char('q'), t0));
        assert!(on_disk(&dir).contains("===column===\nB\n===column===\nsee [[Other]]\n```"));
    }

    #[test]
    fn editing_keys_go_to_the_session() {
        let (dir, mut app) = app_with(&[("plan.md", PLAN)]);
        let t0 = Instant::now();

        press(&mut app, KeyCode::Char('l'), t0);
        press(&mut app, KeyCode::Char('e'), t0);
        assert!(app.is_editing());
        press(&mut app, KeyCode::Char('q'), t0);
        press(&mut app, KeyCode::Esc, t0);
        assert!(!app.is_editing());

        app.flush(t0).unwrap();
        assert_eq!(on_disk(&dir), PLAN);
    }

    #[test]
    fn completion_uses_note_index() {
        let (_dir, mut app) = app_with(&[("plan.md", PLAN), ("Other.md", "x")]);
        let t0 = Instant::now();

        press(&mut app, KeyCode::Char('e'), t0);
        for c in "[[ot".chars() {
            press(&mut app, KeyCode::Char(c), t0);
        }
        assert_eq!(app.completions, vec!["Other".to_string()]);

        press(&mut app, KeyCode::Tab, t0);
        let edit = app.current().unwrap().edit().unwrap();
        assert!(edit.text().ends_with("[[Other]]"));
    }

    #[test]
    fn follow_link_opens_existing_note() {
        let (_dir, mut app) = app_with(&[("plan.md", PLAN), ("Other.md", "no blocks")]);
        press(&mut app, KeyCode::Char('o'), Instant::now());
        assert_eq!(app.file, RelativePathBuf::from("Other.md"));
        assert!(app.blocks.is_empty());
    }

    #[test]
    fn insert_block_appends_to_document() {
        let (dir, mut app) = app_with(&[("plan.md", "just text\n")]);
        assert!(app.blocks.is_empty());

        press(&mut app, KeyCode::Char('b'), Instant::now());
        assert_eq!(app.blocks.len(), 1);
        assert_eq!(
            on_disk(&dir),
            "just text\n```columns\ncolumns: 2\n===column===\n===column===\n```\n"
        );
    }
}
