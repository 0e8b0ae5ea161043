//! Transcript pagination.
//!
//! Turns become word-wrapped, role-coloured blocks stacked down the page.
//! A block never straddles a page boundary: when it does not fit in the
//! space left, a new page starts. A block taller than a whole page is placed
//! at the top margin of a fresh page and allowed to overflow.

use tracing::debug;

use super::canvas::{Canvas, Rect, Rgb, TextMetrics};
use super::header::TranscriptHeader;
use crate::config::ExportConfig;
use crate::core::conversation::{Role, Turn};

/// Page size and margin in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// A4 portrait with a 40pt margin.
    pub const A4: PageGeometry = PageGeometry {
        width: 595.28,
        height: 841.89,
        margin: 40.0,
    };

    /// Widest a block may be.
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest `y` a block may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Horizontal placement of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleStyle {
    pub label: String,
    pub fill: Rgb,
    pub text: Rgb,
    pub align: Align,
}

/// Block geometry shared by every turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMetrics {
    pub font_size: f32,
    pub line_height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub radius: f32,
    pub spacing: f32,
}

impl Default for BlockMetrics {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            line_height: 12.0,
            padding_x: 10.0,
            padding_y: 8.0,
            radius: 8.0,
            spacing: 15.0,
        }
    }
}

/// Header geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderMetrics {
    pub title_size: f32,
    pub title_advance: f32,
    pub detail_size: f32,
    pub detail_advance: f32,
    pub gap_before_rule: f32,
    pub gap_after_rule: f32,
    pub rule_color: Rgb,
}

impl Default for HeaderMetrics {
    fn default() -> Self {
        Self {
            title_size: 12.0,
            title_advance: 20.0,
            detail_size: 10.0,
            detail_advance: 15.0,
            gap_before_rule: 25.0,
            gap_after_rule: 20.0,
            rule_color: Rgb::new(200, 200, 200),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptStyle {
    pub user: RoleStyle,
    pub assistant: RoleStyle,
    pub block: BlockMetrics,
    pub header: HeaderMetrics,
}

impl TranscriptStyle {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            user: RoleStyle {
                label: config.user_label.clone(),
                fill: Rgb::new(220, 230, 250),
                text: Rgb::BLACK,
                align: Align::Right,
            },
            assistant: RoleStyle {
                label: config.assistant_label.clone(),
                fill: Rgb::new(240, 240, 240),
                text: Rgb::BLACK,
                align: Align::Left,
            },
            block: BlockMetrics::default(),
            header: HeaderMetrics::default(),
        }
    }

    pub fn for_role(&self, role: Role) -> &RoleStyle {
        match role {
            Role::User => &self.user,
            Role::Assistant => &self.assistant,
        }
    }
}

impl Default for TranscriptStyle {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// One positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        /// Baseline
        y: f32,
        font_size: f32,
        color: Rgb,
    },
    RoundedRect {
        rect: Rect,
        radius: f32,
        fill: Rgb,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Message block backgrounds on this page.
    pub fn blocks(&self) -> impl Iterator<Item = &Rect> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::RoundedRect { rect, .. } => Some(rect),
            _ => None,
        })
    }

    /// Text runs on this page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A measured, not yet positioned, message block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
    fresh: bool,
}

impl Cursor {
    fn new(top: f32) -> Self {
        Self {
            pages: vec![Page::default()],
            y: top,
            fresh: true,
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn break_page(&mut self, top: f32) {
        self.pages.push(Page::default());
        self.y = top;
        self.fresh = true;
    }
}

/// Lays out a transcript over fixed-size pages.
pub struct Paginator<'a, M: TextMetrics + ?Sized> {
    metrics: &'a M,
    geometry: PageGeometry,
    style: &'a TranscriptStyle,
}

impl<'a, M: TextMetrics + ?Sized> Paginator<'a, M> {
    pub fn new(metrics: &'a M, geometry: PageGeometry, style: &'a TranscriptStyle) -> Self {
        Self {
            metrics,
            geometry,
            style,
        }
    }

    /// Produces at least one page: the header (if any) then every turn.
    pub fn paginate(&self, header: Option<&TranscriptHeader>, turns: &[Turn]) -> Vec<Page> {
        let mut cursor = Cursor::new(self.geometry.margin);

        if let Some(header) = header {
            self.place_header(&mut cursor, header);
        }
        for turn in turns {
            self.place_turn(&mut cursor, turn);
        }

        debug!(turns = turns.len(), pages = cursor.pages.len(), "transcript paginated");
        cursor.pages
    }

    /// Wraps and sizes the block for `turn`.
    pub fn measure(&self, turn: &Turn) -> Block {
        let block = &self.style.block;
        let style = self.style.for_role(turn.role);
        let text = format!("{} {}", style.label, turn.text);

        let max_width = self.geometry.content_width();
        let text_width = max_width - 2.0 * block.padding_x;
        let lines = self
            .metrics
            .split_text_to_size(&text, text_width, block.font_size);

        let widest = lines
            .iter()
            .map(|line| self.metrics.text_width(line, block.font_size))
            .fold(0.0_f32, f32::max);

        Block {
            width: max_width.min(widest + 2.0 * block.padding_x),
            height: lines.len() as f32 * block.line_height + 2.0 * block.padding_y,
            lines,
        }
    }

    fn place_header(&self, cursor: &mut Cursor, header: &TranscriptHeader) {
        let m = &self.style.header;
        let x = self.geometry.margin;

        cursor.push(DrawOp::Text {
            text: header.title.clone(),
            x,
            y: cursor.y,
            font_size: m.title_size,
            color: Rgb::BLACK,
        });
        cursor.y += m.title_advance;

        let details = header.detail_lines();
        let last = details.len() - 1;
        for (i, line) in details.into_iter().enumerate() {
            cursor.push(DrawOp::Text {
                text: line,
                x,
                y: cursor.y,
                font_size: m.detail_size,
                color: Rgb::BLACK,
            });
            cursor.y += if i == last {
                m.gap_before_rule
            } else {
                m.detail_advance
            };
        }

        cursor.push(DrawOp::Rule {
            x1: x,
            x2: self.geometry.width - self.geometry.margin,
            y: cursor.y,
            color: m.rule_color,
        });
        cursor.y += m.gap_after_rule;
        cursor.fresh = false;
    }

    fn place_turn(&self, cursor: &mut Cursor, turn: &Turn) {
        let metrics = &self.style.block;
        let style = self.style.for_role(turn.role);
        let block = self.measure(turn);

        if !cursor.fresh && cursor.y + block.height + self.geometry.margin > self.geometry.height {
            cursor.break_page(self.geometry.margin);
        }

        let rect = Rect {
            x: match style.align {
                Align::Right => self.geometry.width - self.geometry.margin - block.width,
                Align::Left => self.geometry.margin,
            },
            y: cursor.y,
            width: block.width,
            height: block.height,
        };
        cursor.push(DrawOp::RoundedRect {
            rect,
            radius: metrics.radius,
            fill: style.fill,
        });

        let first_baseline = rect.y + metrics.padding_y + self.metrics.ascent(metrics.font_size);
        for (i, line) in block.lines.into_iter().enumerate() {
            let x = match style.align {
                Align::Right => {
                    rect.right()
                        - metrics.padding_x
                        - self.metrics.text_width(&line, metrics.font_size)
                }
                Align::Left => rect.x + metrics.padding_x,
            };
            cursor.push(DrawOp::Text {
                text: line,
                x,
                y: first_baseline + i as f32 * metrics.line_height,
                font_size: metrics.font_size,
                color: style.text,
            });
        }

        cursor.y += block.height + metrics.spacing;
        cursor.fresh = false;
    }
}

/// Replays laid-out pages onto a canvas.
pub fn render<C: Canvas + ?Sized>(pages: &[Page], canvas: &mut C) {
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            canvas.add_page();
        }
        for op in &page.ops {
            match op {
                DrawOp::Text {
                    text,
                    x,
                    y,
                    font_size,
                    color,
                } => {
                    canvas.set_font_size(*font_size);
                    canvas.set_text_color(*color);
                    canvas.text(text, *x, *y);
                }
                DrawOp::RoundedRect { rect, radius, fill } => {
                    canvas.set_fill_color(*fill);
                    canvas.rounded_rect(*rect, *radius);
                }
                DrawOp::Rule { x1, x2, y, color } => {
                    canvas.set_draw_color(*color);
                    canvas.line((*x1, *y), (*x2, *y));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::canvas::testing::{FixedMetrics, RecordingCanvas};
    use super::*;

    const EPS: f32 = 0.01;

    /// 5pt per character at size 10: 99 characters per A4 line.
    const METRICS: FixedMetrics = FixedMetrics { char_width: 5.0 };

    fn header() -> TranscriptHeader {
        TranscriptHeader {
            title: "Insurance Consultation Summary".into(),
            session_id: "session_1_abc".into(),
            consultant: "Tina (AI Insurance Consultant)".into(),
            recommended_policy: "Not yet recommended".into(),
            generated_at: "16 October 2026 at 2:05:09 pm".into(),
        }
    }

    /// Assistant turn that wraps to exactly `lines` lines.
    fn tall_turn(lines: usize) -> Turn {
        Turn::assistant(vec!["x"; lines].join("\n"))
    }

    fn paginate(header: Option<&TranscriptHeader>, turns: &[Turn]) -> Vec<Page> {
        let style = TranscriptStyle::default();
        Paginator::new(&METRICS, PageGeometry::A4, &style).paginate(header, turns)
    }

    #[test]
    fn test_empty_conversation_is_single_header_page() {
        let pages = paginate(Some(&header()), &[]);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].blocks().count(), 0);
        let texts: Vec<_> = pages[0].texts().collect();
        assert_eq!(texts[0], "Insurance Consultation Summary");
        assert!(texts.contains(&"Tracking ID: session_1_abc"));
        assert!(texts.contains(&"Recommended Policy: Not yet recommended"));
        assert!(
            pages[0]
                .ops
                .iter()
                .any(|op| matches!(op, DrawOp::Rule { .. }))
        );
    }

    #[test]
    fn test_header_pushes_first_block_down() {
        let pages = paginate(Some(&header()), &[Turn::assistant("Hi")]);
        let rect = pages[0].blocks().next().unwrap();
        // 40 + 20 + 15 * 3 + 25 + 20
        assert!((rect.y - 150.0).abs() < EPS);
    }

    #[test]
    fn test_block_size_follows_widest_line() {
        let style = TranscriptStyle::default();
        let paginator = Paginator::new(&METRICS, PageGeometry::A4, &style);
        let block = paginator.measure(&Turn::user("hello"));

        // "Me: hello" is 9 chars = 45pt, plus 2 * 10 padding
        assert_eq!(block.lines, vec!["Me: hello"]);
        assert!((block.width - 65.0).abs() < EPS);
        assert!((block.height - (12.0 + 16.0)).abs() < EPS);
    }

    #[test]
    fn test_block_width_caps_at_content_width() {
        let style = TranscriptStyle::default();
        let paginator = Paginator::new(&METRICS, PageGeometry::A4, &style);
        let block = paginator.measure(&Turn::assistant("word ".repeat(200)));

        assert!(block.lines.len() > 1);
        assert!(block.width <= PageGeometry::A4.content_width() + EPS);
        assert!(
            (block.height - (block.lines.len() as f32 * 12.0 + 16.0)).abs() < EPS,
            "height is lines * line_height + 2 * padding"
        );
    }

    #[test]
    fn test_user_blocks_align_right_assistant_left() {
        let geometry = PageGeometry::A4;
        let pages = paginate(None, &[Turn::user("hello"), Turn::assistant("hi there")]);
        let rects: Vec<_> = pages[0].blocks().copied().collect();

        assert!((rects[0].right() - (geometry.width - geometry.margin)).abs() < EPS);
        assert!((rects[1].x - geometry.margin).abs() < EPS);
        assert!(rects[1].y > rects[0].bottom());
        assert!((rects[1].y - (rects[0].bottom() + 15.0)).abs() < EPS);
    }

    #[test]
    fn test_user_lines_right_aligned_inside_block() {
        let pages = paginate(None, &[Turn::user("short\na much longer line")]);
        let rect = *pages[0].blocks().next().unwrap();

        for op in &pages[0].ops {
            if let DrawOp::Text { text, x, .. } = op {
                let right = x + METRICS.text_width(text, 10.0);
                assert!((right - (rect.right() - 10.0)).abs() < EPS, "{text}");
            }
        }
    }

    #[test]
    fn test_assistant_lines_left_aligned_inside_block() {
        let pages = paginate(None, &[Turn::assistant("one\ntwo\nthree")]);
        let rect = *pages[0].blocks().next().unwrap();

        let xs: Vec<f32> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs.len(), 3);
        assert!(xs.iter().all(|x| (x - (rect.x + 10.0)).abs() < EPS));
    }

    #[test]
    fn test_text_stays_inside_block() {
        let pages = paginate(None, &[Turn::assistant("one\ntwo\nthree")]);
        let rect = *pages[0].blocks().next().unwrap();

        for op in &pages[0].ops {
            if let DrawOp::Text { y, .. } = op {
                assert!(*y > rect.y && *y < rect.bottom());
            }
        }
    }

    #[test]
    fn test_each_forced_break_adds_one_page() {
        // 40 lines = 496pt; two never share a page.
        let turns: Vec<_> = (0..4).map(|_| tall_turn(40)).collect();
        let pages = paginate(None, &turns);

        assert_eq!(pages.len(), 4);
        for page in &pages {
            let rects: Vec<_> = page.blocks().collect();
            assert_eq!(rects.len(), 1);
            assert!((rects[0].y - 40.0).abs() < EPS);
        }
    }

    #[test]
    fn test_oversized_block_placed_at_top_margin() {
        let geometry = PageGeometry::A4;
        // 80 lines = 976pt, taller than the 761.89pt usable height.
        let pages = paginate(None, &[Turn::user("hi"), tall_turn(80), Turn::user("bye")]);

        assert_eq!(pages.len(), 3, "hi | oversized | bye");
        let oversized = *pages[1].blocks().next().unwrap();
        assert!((oversized.y - geometry.margin).abs() < EPS);
        assert!(oversized.bottom() > geometry.bottom_limit());
        assert_eq!(pages[1].blocks().count(), 1);
    }

    #[test]
    fn test_oversized_first_block_does_not_leave_blank_page() {
        let pages = paginate(None, &[tall_turn(80)]);
        assert_eq!(pages.len(), 1);
        assert!(pages.iter().all(|p| !p.ops.is_empty()));
    }

    #[test]
    fn test_blocks_never_cross_bottom_margin() {
        let geometry = PageGeometry::A4;
        let turns: Vec<_> = (1..40)
            .map(|i| {
                let text = "lorem ipsum dolor ".repeat(i * 3);
                if i % 2 == 0 {
                    Turn::user(text)
                } else {
                    Turn::assistant(text)
                }
            })
            .collect();
        let pages = paginate(Some(&header()), &turns);

        assert!(pages.len() > 1);
        for page in &pages {
            for rect in page.blocks() {
                assert!(rect.bottom() <= geometry.bottom_limit() + EPS, "{rect:?}");
                assert!(rect.y >= geometry.margin - EPS);
            }
        }
        let total: usize = pages.iter().map(|p| p.blocks().count()).sum();
        assert_eq!(total, turns.len(), "no turn dropped");
    }

    #[test]
    fn test_render_replays_pages() {
        let pages = paginate(Some(&header()), &[tall_turn(40), tall_turn(40)]);
        let mut canvas = RecordingCanvas::new();
        render(&pages, &mut canvas);

        assert_eq!(canvas.count("page"), pages.len() - 1);
        assert_eq!(canvas.count("rect"), 2);
        assert_eq!(canvas.count("line"), 1);
        assert!(canvas.calls.iter().any(|c| c == "text Tracking ID: session_1_abc @ 40,60"));
    }
}
