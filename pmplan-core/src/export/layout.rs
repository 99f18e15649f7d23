//! Document outline and pagination for PDF/DOCX exports

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, SectionDefinition};
use crate::plan::{Plan, SectionContent};

/// Title used when the plan has none
const UNTITLED: &str = "Project Plan";

/// One section as it appears in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineSection {
    pub id: String,
    /// Numbered heading, e.g. "2. Scope Management Plan"
    pub heading: String,
    /// Catalog guidance text
    pub guidance: String,
    /// User text; empty for sections with no content
    pub body: String,
}

/// Everything a document layout service needs, in reading order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOutline {
    pub title: String,
    pub author: Option<String>,
    pub description: String,
    pub sections: Vec<OutlineSection>,
}

impl DocumentOutline {
    /// Build the outline of the enabled sections, in catalog order
    pub fn from_plan(plan: &Plan, catalog: &Catalog, author: Option<&str>) -> Self {
        let effective = plan.effective_catalog(catalog);

        let sections = effective
            .definitions()
            .filter(|d| plan.is_enabled(&d.id))
            .enumerate()
            .map(|(idx, definition)| OutlineSection {
                id: definition.id.clone(),
                heading: format!("{}. {}", idx + 1, definition.title),
                guidance: definition.description.clone(),
                body: section_body(definition, plan.sections.get(&definition.id)),
            })
            .collect();

        let title = plan.title.trim();
        Self {
            title: if title.is_empty() { UNTITLED } else { title }.to_string(),
            author: author
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            description: plan.description.trim().to_string(),
            sections,
        }
    }

    /// (heading, body) pairs in document order
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.sections
            .iter()
            .map(|s| (s.heading.as_str(), s.body.as_str()))
            .collect()
    }
}

/// Body text of a section
///
/// Single-field sections print the bare value; multi-field sections print
/// each filled field under its label.
fn section_body(definition: &SectionDefinition, content: Option<&SectionContent>) -> String {
    let Some(content) = content else {
        return String::new();
    };

    let filled: Vec<(&str, &str)> = definition
        .fields
        .iter()
        .map(|f| (f.label.as_str(), content.value(&f.id).trim()))
        .filter(|(_, value)| !value.is_empty())
        .collect();

    if definition.fields.len() == 1 {
        return filled
            .first()
            .map(|(_, value)| value.to_string())
            .unwrap_or_default();
    }

    filled
        .iter()
        .map(|(label, value)| format!("{}\n{}", label, value))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Vertical metrics of a page, in millimetres from the top edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    /// Where content starts on every page
    pub top_margin: f64,
    /// A new page starts once the cursor passes this point
    pub content_limit: f64,
    pub title_advance: f64,
    pub heading_advance: f64,
    pub line_advance: f64,
    /// Space between the description and the first heading
    pub description_gap: f64,
    pub section_gap: f64,
    /// Maximum characters per wrapped line
    pub wrap_width: usize,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            top_margin: 20.0,
            content_limit: 250.0,
            title_advance: 15.0,
            heading_advance: 10.0,
            line_advance: 5.0,
            description_gap: 10.0,
            section_gap: 8.0,
            wrap_width: 90,
        }
    }
}

/// Role of a placed block, which decides its typeface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Title,
    Author,
    Description,
    Heading,
    Guidance,
    Body,
}

/// Lines of one kind placed at a vertical offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub kind: BlockKind,
    pub y: f64,
    pub lines: Vec<String>,
}

/// One page of a laid-out document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub blocks: Vec<PlacedBlock>,
}

/// A paginated document ready for an encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub title: String,
    pub author: Option<String>,
    pub pages: Vec<Page>,
}

struct Cursor<'a> {
    settings: &'a PageSettings,
    pages: Vec<Page>,
    y: f64,
}

impl<'a> Cursor<'a> {
    fn new(settings: &'a PageSettings) -> Self {
        Self {
            settings,
            pages: vec![Page {
                number: 1,
                blocks: Vec::new(),
            }],
            y: settings.top_margin,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page {
            number: self.pages.len() + 1,
            blocks: Vec::new(),
        });
        self.y = self.settings.top_margin;
    }

    fn ensure_room(&mut self) {
        if self.y > self.settings.content_limit {
            self.new_page();
        }
    }

    fn push(&mut self, block: PlacedBlock) {
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(block);
        }
    }

    /// Place a wrapped title or heading as one block
    ///
    /// The first line takes `advance`, each further line a line advance.
    fn place_heading(&mut self, kind: BlockKind, text: &str, advance: f64) {
        let mut lines = wrap_text(text, self.settings.wrap_width);
        if lines.is_empty() {
            lines.push(text.to_string());
        }
        let extra = (lines.len() - 1) as f64 * self.settings.line_advance;

        self.ensure_room();
        self.push(PlacedBlock {
            kind,
            y: self.y,
            lines,
        });
        self.y += advance + extra;
    }

    /// Place wrapped lines, continuing on a new page when space runs out
    fn place_lines(&mut self, kind: BlockKind, lines: Vec<String>) {
        let mut block: Option<PlacedBlock> = None;

        for line in lines {
            if self.y > self.settings.content_limit {
                if let Some(full) = block.take() {
                    self.push(full);
                }
                self.new_page();
            }

            let y = self.y;
            block
                .get_or_insert_with(|| PlacedBlock {
                    kind,
                    y,
                    lines: Vec::new(),
                })
                .lines
                .push(line);
            self.y += self.settings.line_advance;
        }

        if let Some(block) = block {
            self.push(block);
        }
    }

    fn skip(&mut self, amount: f64) {
        self.y += amount;
    }
}

/// Lay an outline out on fixed-height pages
///
/// Title block first, then per section a heading, its guidance and its
/// body. A new page starts whenever the cursor has passed the content limit.
pub fn paginate(outline: &DocumentOutline, settings: &PageSettings) -> DocumentLayout {
    let mut cursor = Cursor::new(settings);

    cursor.place_heading(BlockKind::Title, &outline.title, settings.title_advance);

    if !outline.description.is_empty() {
        cursor.place_lines(
            BlockKind::Description,
            wrap_text(&outline.description, settings.wrap_width),
        );
    }

    if let Some(author) = &outline.author {
        let line = format!("Prepared by {}", author);
        cursor.place_lines(BlockKind::Author, wrap_text(&line, settings.wrap_width));
    }
    if outline.author.is_some() || !outline.description.is_empty() {
        cursor.skip(settings.description_gap);
    }

    for section in &outline.sections {
        cursor.place_heading(BlockKind::Heading, &section.heading, settings.heading_advance);

        if !section.guidance.is_empty() {
            cursor.place_lines(
                BlockKind::Guidance,
                wrap_text(&section.guidance, settings.wrap_width),
            );
        }
        if !section.body.is_empty() {
            cursor.place_lines(
                BlockKind::Body,
                wrap_text(&section.body, settings.wrap_width),
            );
        }

        cursor.skip(settings.section_gap);
    }

    tracing::debug!(pages = cursor.pages.len(), "Paginated document");

    DocumentLayout {
        title: outline.title.clone(),
        author: outline.author.clone(),
        pages: cursor.pages,
    }
}

/// Greedy word wrap
///
/// Newlines are kept as line breaks and blank lines survive as empty
/// lines. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanStore;
    use std::sync::Arc;

    fn outline_with(sections: usize, body: &str) -> DocumentOutline {
        DocumentOutline {
            title: "Plan".to_string(),
            author: None,
            description: String::new(),
            sections: (1..=sections)
                .map(|i| OutlineSection {
                    id: format!("s{}", i),
                    heading: format!("{}. Section", i),
                    guidance: "Guidance".to_string(),
                    body: body.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("the quick brown fox", 9),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_short_document_fits_one_page() {
        let layout = paginate(&outline_with(2, "Body"), &PageSettings::default());
        assert_eq!(layout.pages.len(), 1);

        let kinds: Vec<BlockKind> = layout.pages[0].blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Title,
                BlockKind::Heading,
                BlockKind::Guidance,
                BlockKind::Body,
                BlockKind::Heading,
                BlockKind::Guidance,
                BlockKind::Body,
            ]
        );
        assert_eq!(layout.pages[0].blocks[0].y, 20.0);
        assert_eq!(layout.pages[0].blocks[1].y, 35.0);
    }

    #[test]
    fn test_description_pushes_sections_down() {
        let mut outline = outline_with(1, "");
        outline.description = "Short summary".to_string();

        let layout = paginate(&outline, &PageSettings::default());
        let blocks = &layout.pages[0].blocks;
        assert_eq!(blocks[1].kind, BlockKind::Description);
        assert_eq!(blocks[1].y, 35.0);
        assert_eq!(blocks[2].kind, BlockKind::Heading);
        assert_eq!(blocks[2].y, 50.0);
    }

    #[test]
    fn test_author_follows_description() {
        let mut outline = outline_with(1, "");
        outline.description = "Short summary".to_string();
        outline.author = Some("Ada".to_string());

        let layout = paginate(&outline, &PageSettings::default());
        let blocks = &layout.pages[0].blocks;
        assert_eq!(blocks[1].kind, BlockKind::Description);
        assert_eq!(blocks[1].y, 35.0);
        assert_eq!(blocks[2].kind, BlockKind::Author);
        assert_eq!(blocks[2].lines, vec!["Prepared by Ada"]);
        assert_eq!(blocks[3].kind, BlockKind::Heading);
        assert_eq!(blocks[3].y, 55.0);
    }

    #[test]
    fn test_long_heading_wraps() {
        let mut outline = outline_with(2, "Body");
        outline.sections[0].heading = format!("1. {}", vec!["Vendor"; 20].join(" "));

        let settings = PageSettings::default();
        let layout = paginate(&outline, &settings);
        let blocks = &layout.pages[0].blocks;

        assert_eq!(blocks[1].kind, BlockKind::Heading);
        assert_eq!(blocks[1].lines.len(), 2);
        assert!(blocks[1]
            .lines
            .iter()
            .all(|l| l.chars().count() <= settings.wrap_width));
        // The guidance moves down by one extra line
        assert_eq!(blocks[2].y, 35.0 + 10.0 + 5.0);
    }

    #[test]
    fn test_new_page_after_threshold() {
        let settings = PageSettings::default();
        // Each section uses 10 + 5 + 5 + 8 = 28
        let layout = paginate(&outline_with(12, "Body"), &settings);
        assert!(layout.pages.len() > 1);

        for (idx, page) in layout.pages.iter().enumerate() {
            assert_eq!(page.number, idx + 1);
            for block in &page.blocks {
                assert!(block.y <= settings.content_limit);
            }
        }
        assert_eq!(layout.pages[1].blocks[0].y, settings.top_margin);
    }

    #[test]
    fn test_long_body_splits_across_pages() {
        let body = vec!["line"; 80].join("\n");
        let layout = paginate(&outline_with(1, &body), &PageSettings::default());
        assert!(layout.pages.len() >= 2);

        let body_lines: usize = layout
            .pages
            .iter()
            .flat_map(|p| &p.blocks)
            .filter(|b| b.kind == BlockKind::Body)
            .map(|b| b.lines.len())
            .sum();
        assert_eq!(body_lines, 80);
    }

    #[test]
    fn test_outline_from_plan() {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        let mut store = PlanStore::new(catalog);
        store
            .set_field("project-charter", "purpose", "Replace the billing system")
            .unwrap();
        store.toggle_section("project-closure").unwrap();
        store.toggle_section("cost-management").unwrap();

        let outline = DocumentOutline::from_plan(store.plan(), store.catalog(), Some("  Ada "));
        assert_eq!(outline.title, "Project Plan");
        assert_eq!(outline.author.as_deref(), Some("Ada"));

        let headings: Vec<&str> = outline.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "1. Project Charter",
                "2. Scope Management Plan",
                "3. Cost Management Plan",
                "4. Risk Management Plan",
                "5. Project Closure",
            ]
        );
        assert_eq!(
            outline.sections[0].body,
            "Project purpose and justification\nReplace the billing system"
        );
        assert!(outline.sections[1].body.is_empty());
        assert_eq!(outline.pairs().len(), 5);
    }
}
