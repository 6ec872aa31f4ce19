//! Marker-delimited sourcing block in the user's shell rc file.
//!
//! The editing functions ([`block_state`], [`inject`], [`eject`]) are pure
//! string transforms.  [`RcFile`] wraps them with reading and atomic writes.
use anyhow::Result;
use serde::Serialize;
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::helpers::fs::{read_optional, write_atomic};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// First line of the block.
pub const START_MARKER: &str = "# >>> acorn shell integration >>>";
/// Last line of the block.
pub const END_MARKER: &str = "# <<< acorn shell integration <<<";

/// Presence of the block in some content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    /// No complete block.
    NotPresent,
    /// Block present with the expected body.
    PresentCorrect,
    /// Block present with a different body.
    PresentStale,
}

/// Result of [`inject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// State before injecting.
    pub state: BlockState,
    /// New content.
    pub content: String,
}

/// Result of [`eject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ejection {
    /// State before ejecting.
    pub state: BlockState,
    /// New content.
    pub content: String,
}

/// The single statement placed inside the block.
#[must_use]
pub fn source_line(entrypoint: &Path) -> String {
    let path = entrypoint.display();
    format!("[ -f \"{path}\" ] && . \"{path}\"")
}

/// Byte ranges of a located block.
struct Located {
    /// From the start of the start-marker line to the end of the end-marker line.
    whole: Range<usize>,
    /// Lines strictly between the markers.
    inner: Range<usize>,
}

fn is_marker(line: &str, marker: &str) -> bool {
    line.trim_end() == marker
}

/// Find the first complete block.  A start marker seen while another is
/// still open replaces it, so an unterminated marker never swallows user lines.
fn locate(content: &str) -> Option<Located> {
    let mut offset = 0;
    let mut start: Option<(usize, usize)> = None;
    for line in content.split_inclusive('\n') {
        let begin = offset;
        offset += line.len();
        match start {
            _ if is_marker(line, START_MARKER) => start = Some((begin, offset)),
            Some((block_begin, inner_begin)) if is_marker(line, END_MARKER) => {
                return Some(Located {
                    whole: block_begin..offset,
                    inner: inner_begin..begin,
                });
            }
            _ => {}
        }
    }
    None
}

fn expected_inner(body: &str) -> String {
    let mut inner = body.trim_end_matches('\n').to_string();
    inner.push('\n');
    inner
}

/// Classify the block in `content` against the desired `body`.
///
/// # Examples
///
/// ```
/// use acorn_cli::resources::rc_block::{block_state, inject, BlockState};
///
/// assert_eq!(block_state("export A=1\n", "body"), BlockState::NotPresent);
/// let injected = inject("export A=1\n", "body").content;
/// assert_eq!(block_state(&injected, "body"), BlockState::PresentCorrect);
/// assert_eq!(block_state(&injected, "other"), BlockState::PresentStale);
/// ```
#[must_use]
pub fn block_state(content: &str, body: &str) -> BlockState {
    match locate(content) {
        None => BlockState::NotPresent,
        Some(found)
            if content.get(found.inner.clone()) == Some(expected_inner(body).as_str()) =>
        {
            BlockState::PresentCorrect
        }
        Some(_) => BlockState::PresentStale,
    }
}

/// Add or refresh the block.
///
/// A missing block is appended; a stale block has only the lines between its
/// markers replaced.  Everything outside the markers is preserved.
#[must_use]
pub fn inject(content: &str, body: &str) -> Injection {
    let state = block_state(content, body);
    let inner = expected_inner(body);
    let content = match (state, locate(content)) {
        (BlockState::PresentStale, Some(found)) => {
            let mut out = String::with_capacity(content.len() + inner.len());
            out.push_str(content.get(..found.inner.start).unwrap_or_default());
            out.push_str(&inner);
            out.push_str(content.get(found.inner.end..).unwrap_or_default());
            out
        }
        (BlockState::NotPresent, _) => {
            let mut out = content.to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(START_MARKER);
            out.push('\n');
            out.push_str(&inner);
            out.push_str(END_MARKER);
            out.push('\n');
            out
        }
        _ => content.to_string(),
    };
    Injection { state, content }
}

/// Remove the block, marker lines included.
///
/// A start marker without a matching end marker is not a block; nothing is
/// removed in that case.
#[must_use]
pub fn eject(content: &str) -> Ejection {
    match locate(content) {
        None => Ejection {
            state: BlockState::NotPresent,
            content: content.to_string(),
        },
        Some(found) => {
            let mut out = String::with_capacity(content.len());
            out.push_str(content.get(..found.whole.start).unwrap_or_default());
            out.push_str(content.get(found.whole.end..).unwrap_or_default());
            Ejection {
                state: BlockState::PresentCorrect,
                content: out,
            }
        }
    }
}

/// What an rc-file operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RcAction {
    /// Block appended.
    Injected,
    /// Stale block refreshed.
    Updated,
    /// Block already correct.
    AlreadyInjected,
    /// Dry run: block would be appended.
    WouldInject,
    /// Dry run: stale block would be refreshed.
    WouldUpdate,
    /// Block removed.
    Ejected,
    /// Dry run: block would be removed.
    WouldEject,
    /// No block to remove.
    NotInjected,
}

impl RcAction {
    /// Whether the file was (or would be) modified.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::AlreadyInjected | Self::NotInjected)
    }
}

impl std::fmt::Display for RcAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Injected => "injected",
            Self::Updated => "updated",
            Self::AlreadyInjected => "already injected",
            Self::WouldInject => "would inject",
            Self::WouldUpdate => "would update",
            Self::Ejected => "ejected",
            Self::WouldEject => "would eject",
            Self::NotInjected => "not injected",
        };
        f.write_str(s)
    }
}

/// A shell rc file and the sourcing block it should carry.
#[derive(Debug, Clone)]
pub struct RcFile {
    /// Path to the rc file.
    pub path: PathBuf,
    /// Block body.
    pub body: String,
}

impl RcFile {
    /// Rc file whose block sources `entrypoint`.
    #[must_use]
    pub fn new(path: PathBuf, entrypoint: &Path) -> Self {
        Self {
            path,
            body: source_line(entrypoint),
        }
    }

    fn read(&self) -> Result<String> {
        Ok(read_optional(&self.path)?.unwrap_or_default())
    }

    /// Write through a symlinked rc file instead of replacing the link.
    fn write(&self, content: &str) -> Result<()> {
        let path = if self.path.is_symlink() {
            dunce::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone())
        } else {
            self.path.clone()
        };
        write_atomic(&path, content)?;
        Ok(())
    }

    /// Current block state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn state(&self) -> Result<BlockState> {
        Ok(block_state(&self.read()?, &self.body))
    }

    /// Inject or refresh the block.  The file is created when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn inject(&self, dry_run: bool) -> Result<RcAction> {
        let result = inject(&self.read()?, &self.body);
        let action = match (result.state, dry_run) {
            (BlockState::PresentCorrect, _) => return Ok(RcAction::AlreadyInjected),
            (BlockState::NotPresent, true) => return Ok(RcAction::WouldInject),
            (BlockState::PresentStale, true) => return Ok(RcAction::WouldUpdate),
            (BlockState::NotPresent, false) => RcAction::Injected,
            (BlockState::PresentStale, false) => RcAction::Updated,
        };
        self.write(&result.content)?;
        Ok(action)
    }

    /// Remove the block.  A missing file is left missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn eject(&self, dry_run: bool) -> Result<RcAction> {
        let result = eject(&self.read()?);
        if result.state == BlockState::NotPresent {
            return Ok(RcAction::NotInjected);
        }
        if dry_run {
            return Ok(RcAction::WouldEject);
        }
        self.write(&result.content)?;
        Ok(RcAction::Ejected)
    }
}

impl Applicable for RcFile {
    fn description(&self) -> String {
        format!("acorn block in {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        Ok(match self.inject(false)? {
            RcAction::AlreadyInjected => ResourceChange::AlreadyCorrect,
            _ => ResourceChange::Applied,
        })
    }

    fn remove(&self) -> Result<ResourceChange> {
        Ok(match self.eject(false)? {
            RcAction::NotInjected => ResourceChange::AlreadyCorrect,
            _ => ResourceChange::Applied,
        })
    }
}

impl Resource for RcFile {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(match self.state()? {
            BlockState::NotPresent => ResourceState::Missing,
            BlockState::PresentCorrect => ResourceState::Correct,
            BlockState::PresentStale => ResourceState::Incorrect {
                current: "stale block".to_string(),
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const BODY: &str = "[ -f \"/p/shell.sh\" ] && . \"/p/shell.sh\"";

    fn block(body: &str) -> String {
        format!("{START_MARKER}\n{body}\n{END_MARKER}\n")
    }

    /// Rc shapes that end in a newline (or are empty).
    const SHAPES: &[&str] = &[
        "",
        "\n",
        "export A=1\n",
        "export A=1\n\n\n",
        "# comment\nalias x='y'\n# >>> other tool >>>\nfoo\n# <<< other tool <<<\n",
        "echo '# >>> acorn shell integration >>>'\n",
        "  # >>> acorn shell integration >>>\nindented marker is not a marker\n",
        "export A=1\r\nexport B=2\r\n",
        "# >>> acorn shell integration >>>\nunterminated start marker\n",
    ];

    // -----------------------------------------------------------------------
    // pure editing
    // -----------------------------------------------------------------------

    #[test]
    fn inject_then_eject_restores_every_shape() {
        for shape in SHAPES {
            let injected = inject(shape, BODY);
            assert_eq!(injected.state, BlockState::NotPresent, "{shape:?}");
            let ejected = eject(&injected.content);
            assert_eq!(&ejected.content, shape, "{shape:?}");
        }
    }

    #[test]
    fn inject_is_idempotent_for_every_shape() {
        for shape in SHAPES {
            let once = inject(shape, BODY).content;
            let twice = inject(&once, BODY);
            assert_eq!(twice.state, BlockState::PresentCorrect, "{shape:?}");
            assert_eq!(twice.content, once, "{shape:?}");
        }
    }

    #[test]
    fn inject_appends_separator_when_missing_newline() {
        let out = inject("export A=1", BODY).content;
        assert_eq!(out, format!("export A=1\n{}", block(BODY)));
    }

    #[test]
    fn inject_into_empty_file_is_just_the_block() {
        assert_eq!(inject("", BODY).content, block(BODY));
    }

    #[test]
    fn stale_block_replaced_between_markers_only() {
        let before = "a\n";
        let after = "b\n";
        let content = format!("{before}{}{after}", block("old body"));
        let result = inject(&content, BODY);
        assert_eq!(result.state, BlockState::PresentStale);
        assert_eq!(result.content, format!("{before}{}{after}", block(BODY)));
    }

    #[test]
    fn stale_multi_line_block_collapses_to_body() {
        let content = format!("{START_MARKER}\nline one\nline two\n{END_MARKER}\n");
        assert_eq!(inject(&content, BODY).content, block(BODY));
    }

    #[test]
    fn crlf_markers_are_recognized() {
        let content = format!("x\r\n{START_MARKER}\r\n{BODY}\n{END_MARKER}\r\ny\r\n");
        assert_eq!(block_state(&content, BODY), BlockState::PresentCorrect);
        assert_eq!(eject(&content).content, "x\r\ny\r\n");
    }

    #[test]
    fn trailing_whitespace_on_markers_is_tolerated() {
        let content = format!("{START_MARKER}  \n{BODY}\n{END_MARKER}\t\n");
        assert_eq!(block_state(&content, BODY), BlockState::PresentCorrect);
    }

    #[test]
    fn start_without_end_is_not_present() {
        let content = format!("{START_MARKER}\nuser stuff\n");
        assert_eq!(block_state(&content, BODY), BlockState::NotPresent);
        let ejected = eject(&content);
        assert_eq!(ejected.state, BlockState::NotPresent);
        assert_eq!(ejected.content, content);
    }

    #[test]
    fn eject_keeps_surrounding_content() {
        let content = format!("top\n{}bottom\n", block(BODY));
        assert_eq!(eject(&content).content, "top\nbottom\n");
    }

    #[test]
    fn eject_block_without_final_newline() {
        let content = format!("top\n{START_MARKER}\n{BODY}\n{END_MARKER}");
        assert_eq!(eject(&content).content, "top\n");
    }

    #[test]
    fn only_first_block_is_touched() {
        let content = format!("{}mid\n{}", block("old"), block("old"));
        let out = inject(&content, BODY).content;
        assert_eq!(out, format!("{}mid\n{}", block(BODY), block("old")));
    }

    #[test]
    fn source_line_quotes_path() {
        assert_eq!(source_line(Path::new("/p/shell.sh")), BODY);
    }

    // -----------------------------------------------------------------------
    // RcFile
    // -----------------------------------------------------------------------

    fn rc(dir: &Path) -> RcFile {
        RcFile::new(dir.join(".bashrc"), Path::new("/p/shell.sh"))
    }

    #[test]
    fn rc_inject_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = rc(dir.path());
        assert_eq!(file.inject(false).unwrap(), RcAction::Injected);
        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), block(BODY));
        assert_eq!(file.inject(false).unwrap(), RcAction::AlreadyInjected);
    }

    #[test]
    fn rc_inject_updates_stale_block() {
        let dir = tempfile::tempdir().unwrap();
        let file = rc(dir.path());
        std::fs::write(&file.path, format!("x\n{}", block("old"))).unwrap();
        assert_eq!(file.current_state().unwrap(), ResourceState::Incorrect {
            current: "stale block".to_string()
        });
        assert_eq!(file.inject(false).unwrap(), RcAction::Updated);
        assert_eq!(file.state().unwrap(), BlockState::PresentCorrect);
    }

    #[test]
    fn rc_dry_run_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let file = rc(dir.path());
        assert_eq!(file.inject(true).unwrap(), RcAction::WouldInject);
        assert!(!file.path.exists());

        std::fs::write(&file.path, block("old")).unwrap();
        assert_eq!(file.inject(true).unwrap(), RcAction::WouldUpdate);
        assert_eq!(file.eject(true).unwrap(), RcAction::WouldEject);
        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), block("old"));
    }

    #[test]
    fn rc_eject_missing_file_stays_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = rc(dir.path());
        assert_eq!(file.eject(false).unwrap(), RcAction::NotInjected);
        assert!(!file.path.exists());
    }

    #[test]
    fn rc_apply_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = rc(dir.path());
        std::fs::write(&file.path, "export A=1\n").unwrap();
        assert_eq!(file.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(file.remove().unwrap(), ResourceChange::Applied);
        assert_eq!(file.remove().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), "export A=1\n");
    }

    #[cfg(unix)]
    #[test]
    fn rc_symlink_is_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("dotfiles-bashrc");
        std::fs::write(&real, "export A=1\n").unwrap();
        let file = rc(dir.path());
        std::os::unix::fs::symlink(&real, &file.path).unwrap();

        file.inject(false).unwrap();

        assert!(file.path.symlink_metadata().unwrap().is_symlink());
        assert!(std::fs::read_to_string(&real).unwrap().contains(START_MARKER));
    }

    #[cfg(unix)]
    #[test]
    fn rc_mode_survives_inject_and_eject() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = rc(dir.path());
        std::fs::write(&file.path, "export A=1\n").unwrap();
        std::fs::set_permissions(&file.path, std::fs::Permissions::from_mode(0o600)).unwrap();
        let mode = || std::fs::metadata(&file.path).unwrap().permissions().mode() & 0o777;

        file.inject(false).unwrap();
        assert_eq!(mode(), 0o600);

        file.eject(false).unwrap();
        assert_eq!(mode(), 0o600);
    }
}
