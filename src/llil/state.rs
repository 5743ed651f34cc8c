//! The LLIL layered state machine (spec §4.8): top level, page header, and
//! page body with its own initial/path/text sub-modes. Grounded in the
//! teacher's `PdfPage`/content-stream assembly, which likewise tracks a
//! page's open/closed state and its current drawing mode — reshaped here
//! into an explicit state type per the REDESIGN FLAGS guidance (an
//! instruction-dispatch table over an enum, not a class hierarchy).

use crate::error::Error;
use crate::llil::ops::BoxRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathInstrKind {
    Move,
    Line,
    Curve,
    Close,
    Rect,
}

#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    last: Option<PathInstrKind>,
    any_ran: bool,
}

impl PathTracker {
    pub fn record_move(&mut self) -> Result<(), Error> {
        if self.last == Some(PathInstrKind::Move) {
            return Err(Error::state("move may not follow move"));
        }
        self.last = Some(PathInstrKind::Move);
        self.any_ran = true;
        Ok(())
    }

    pub fn record_line_or_curve(&mut self, kind: PathInstrKind) -> Result<(), Error> {
        match self.last {
            Some(PathInstrKind::Move) | Some(PathInstrKind::Line) | Some(PathInstrKind::Curve) => {
                self.last = Some(kind);
                self.any_ran = true;
                Ok(())
            }
            _ => Err(Error::state("line/curve requires a preceding move, line, or curve")),
        }
    }

    pub fn record_close(&mut self) -> Result<(), Error> {
        match self.last {
            Some(PathInstrKind::Line) | Some(PathInstrKind::Curve) => {
                self.last = Some(PathInstrKind::Close);
                self.any_ran = true;
                Ok(())
            }
            _ => Err(Error::state("close requires a preceding line or curve")),
        }
    }

    pub fn record_rect(&mut self) -> Result<(), Error> {
        if self.last == Some(PathInstrKind::Move) {
            return Err(Error::state("rect must not follow move"));
        }
        self.last = Some(PathInstrKind::Rect);
        self.any_ran = true;
        Ok(())
    }

    pub fn validate_end(&self) -> Result<(), Error> {
        if !self.any_ran {
            return Err(Error::state("end path requires at least one path instruction"));
        }
        if self.last == Some(PathInstrKind::Move) {
            return Err(Error::state("end path must not follow move"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextTracker {
    write_count: usize,
}

impl TextTracker {
    pub fn record_write(&mut self) {
        self.write_count += 1;
    }

    pub fn validate_end(&self) -> Result<(), Error> {
        if self.write_count == 0 {
            return Err(Error::state("end text requires at least one write"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum BodyMode {
    Initial,
    Path(PathTracker),
    Text(TextTracker),
}

#[derive(Debug, Clone, Default)]
struct HeaderBoxes {
    dim: Option<(crate::fixed::FixedPoint, crate::fixed::FixedPoint)>,
    bleed: Option<BoxRect>,
    trim: Option<BoxRect>,
    art: Option<BoxRect>,
}

#[derive(Debug, Clone)]
pub struct PageBody {
    pub mode: BodyMode,
    /// `save`/`restore` snapshots of the selected font's assigned name.
    gs_stack: Vec<Option<String>>,
    current_font: Option<String>,
}

impl PageBody {
    fn new() -> Self {
        PageBody { mode: BodyMode::Initial, gs_stack: Vec::new(), current_font: None }
    }

    pub fn save(&mut self) {
        self.gs_stack.push(self.current_font.clone());
    }

    pub fn restore(&mut self) -> Result<(), Error> {
        let snapshot = self.gs_stack.pop().ok_or_else(|| Error::state("restore with no matching save"))?;
        self.current_font = snapshot;
        Ok(())
    }

    pub fn select_font(&mut self, name: String) {
        self.current_font = Some(name);
    }

    pub fn font_selected(&self) -> bool {
        self.current_font.is_some()
    }

    pub fn gs_depth(&self) -> usize {
        self.gs_stack.len()
    }
}

#[derive(Debug, Clone)]
pub enum State {
    TopLevel { pages_defined: usize },
    PageHeader { boxes: HeaderBoxes, pages_defined: usize },
    PageBody { body: PageBody, boxes: HeaderBoxes, pages_defined: usize },
}

impl State {
    pub fn new() -> Self {
        State::TopLevel { pages_defined: 0 }
    }

    pub fn can_stop(&self) -> bool {
        matches!(self, State::TopLevel { pages_defined } if *pages_defined > 0)
    }

    pub fn begin_page(&mut self) -> Result<(), Error> {
        match self {
            State::TopLevel { pages_defined } => {
                *self = State::PageHeader { boxes: HeaderBoxes::default(), pages_defined: *pages_defined };
                Ok(())
            }
            _ => Err(Error::state("begin page must not nest")),
        }
    }

    pub fn header_dim(&mut self, width: crate::fixed::FixedPoint, height: crate::fixed::FixedPoint) -> Result<(), Error> {
        match self {
            State::PageHeader { boxes, .. } => {
                boxes.dim = Some((width, height));
                Ok(())
            }
            _ => Err(Error::state("dim is only valid in the page header")),
        }
    }

    pub fn header_box(&mut self, which: BoxWhich, rect: BoxRect) -> Result<(), Error> {
        match self {
            State::PageHeader { boxes, .. } => {
                match which {
                    BoxWhich::Bleed => boxes.bleed = Some(rect),
                    BoxWhich::Trim => boxes.trim = Some(rect),
                    BoxWhich::Art => boxes.art = Some(rect),
                }
                Ok(())
            }
            _ => Err(Error::state("boundary boxes are only valid in the page header")),
        }
    }

    /// `body`: requires `dim` defined, performs the deferred box-vs-page
    /// containment check, then transitions to page body / initial.
    pub fn body(&mut self) -> Result<(), Error> {
        match self {
            State::PageHeader { boxes, pages_defined } => {
                let (width, height) = boxes.dim.ok_or_else(|| Error::state("body requires dim to be defined"))?;
                for rect in [&boxes.bleed, &boxes.trim, &boxes.art].into_iter().flatten() {
                    if !(rect.x1 < width) || !(rect.y1 < height) {
                        return Err(Error::domain("boundary box exceeds page dimensions"));
                    }
                }
                *self = State::PageBody {
                    body: PageBody::new(),
                    boxes: boxes.clone(),
                    pages_defined: *pages_defined,
                };
                Ok(())
            }
            _ => Err(Error::state("body is only valid in the page header")),
        }
    }

    /// Snapshot of the header's accumulated `dim`/boundary boxes, for the
    /// processor to hand to the PDF writer once `body` opens the page.
    pub fn header_snapshot(
        &self,
    ) -> Result<(crate::fixed::FixedPoint, crate::fixed::FixedPoint, Option<BoxRect>, Option<BoxRect>, Option<BoxRect>), Error> {
        match self {
            State::PageHeader { boxes, .. } => {
                let (width, height) = boxes.dim.ok_or_else(|| Error::state("body requires dim to be defined"))?;
                Ok((width, height, boxes.bleed.clone(), boxes.trim.clone(), boxes.art.clone()))
            }
            _ => Err(Error::state("header snapshot is only valid in the page header")),
        }
    }

    pub fn body_mut(&mut self) -> Result<&mut PageBody, Error> {
        match self {
            State::PageBody { body, .. } => Ok(body),
            _ => Err(Error::state("instruction is only valid in the page body")),
        }
    }

    /// `stroke`/`fill`/`clip` are whether that paint argument is non-null;
    /// at least one must be set or the path block paints nothing.
    pub fn begin_path(&mut self, stroke: bool, fill: bool, clip: bool) -> Result<(), Error> {
        if !stroke && !fill && !clip {
            return Err(Error::state("begin path requires at least one of stroke, fill or clip"));
        }
        let body = self.body_mut()?;
        match &body.mode {
            BodyMode::Initial => {
                body.mode = BodyMode::Path(PathTracker::default());
                Ok(())
            }
            _ => Err(Error::state("begin path requires the page body's initial mode")),
        }
    }

    pub fn end_path(&mut self) -> Result<(), Error> {
        let body = self.body_mut()?;
        match &body.mode {
            BodyMode::Path(tracker) => {
                tracker.validate_end()?;
                body.mode = BodyMode::Initial;
                Ok(())
            }
            _ => Err(Error::state("end path requires the page body's path mode")),
        }
    }

    pub fn path_tracker_mut(&mut self) -> Result<&mut PathTracker, Error> {
        let body = self.body_mut()?;
        match &mut body.mode {
            BodyMode::Path(tracker) => Ok(tracker),
            _ => Err(Error::state("path instruction outside path mode")),
        }
    }

    pub fn begin_text(&mut self) -> Result<(), Error> {
        let body = self.body_mut()?;
        match &body.mode {
            BodyMode::Initial => {
                body.mode = BodyMode::Text(TextTracker::default());
                Ok(())
            }
            _ => Err(Error::state("begin text requires the page body's initial mode")),
        }
    }

    pub fn end_text(&mut self) -> Result<(), Error> {
        let body = self.body_mut()?;
        match &body.mode {
            BodyMode::Text(tracker) => {
                tracker.validate_end()?;
                body.mode = BodyMode::Initial;
                Ok(())
            }
            _ => Err(Error::state("end text requires the page body's text mode")),
        }
    }

    pub fn record_write(&mut self) -> Result<(), Error> {
        let body = self.body_mut()?;
        if !body.font_selected() {
            return Err(Error::state("write requires an active font selection"));
        }
        match &mut body.mode {
            BodyMode::Text(tracker) => {
                tracker.record_write();
                Ok(())
            }
            _ => Err(Error::state("write requires text mode")),
        }
    }

    pub fn end_page(&mut self) -> Result<(), Error> {
        match self {
            State::PageBody { body, pages_defined, .. } => {
                if !matches!(body.mode, BodyMode::Initial) {
                    return Err(Error::state("end page requires the page body's initial mode"));
                }
                if body.gs_depth() != 0 {
                    return Err(Error::state("end page requires a balanced graphics-state stack"));
                }
                *self = State::TopLevel { pages_defined: *pages_defined + 1 };
                Ok(())
            }
            _ => Err(Error::state("end page is only valid inside a page body")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum BoxWhich {
    Bleed,
    Trim,
    Art,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FixedPoint;

    fn page_body_state() -> State {
        let mut state = State::new();
        state.begin_page().unwrap();
        state.header_dim(FixedPoint::parse("100").unwrap(), FixedPoint::parse("100").unwrap()).unwrap();
        state.body().unwrap();
        state
    }

    #[test]
    fn begin_path_rejects_all_null_paint() {
        let mut state = page_body_state();
        let err = state.begin_path(false, false, false).unwrap_err();
        assert_eq!(err.kind(), "StateError");
    }

    #[test]
    fn begin_path_accepts_any_single_paint_argument() {
        assert!(page_body_state().begin_path(true, false, false).is_ok());
        assert!(page_body_state().begin_path(false, true, false).is_ok());
        assert!(page_body_state().begin_path(false, false, true).is_ok());
    }
}
