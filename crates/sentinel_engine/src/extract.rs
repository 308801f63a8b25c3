use scraper::{ElementRef, Html, Selector};

use crate::page::Page;
use crate::{ExtractionResult, ItemList};

pub const DEFAULT_FRAME_NAME: &str = "cjcx_list_frm";
pub const DEFAULT_CONTAINER_ID: &str = "dataList";

/// Rows need more than this many cells to carry an item.
const MIN_CELLS_EXCLUSIVE: usize = 4;
/// Zero-based index of the cell holding the item name.
const NAME_CELL: usize = 3;
/// Shorter names are rendering noise.
pub const MIN_ITEM_NAME_CHARS: usize = 2;

/// Normalizes rendered cell text into an item name, or rejects it as noise.
pub fn item_name(raw: &str) -> Option<String> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (normalized.chars().count() >= MIN_ITEM_NAME_CHARS).then_some(normalized)
}

/// Reads item names out of a results table inside a named frame.
///
/// - missing frame, missing container, or a container without data cells
///   yield `NotFound`
/// - every `tr` with more than four `td` contributes its fourth cell's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExtractor {
    frame_name: String,
    container_id: String,
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_NAME, DEFAULT_CONTAINER_ID)
    }
}

impl TableExtractor {
    pub fn new(frame_name: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            frame_name: frame_name.into(),
            container_id: container_id.into(),
        }
    }

    pub fn frame_name(&self) -> &str {
        &self.frame_name
    }

    pub async fn extract(&self, page: &dyn Page) -> ExtractionResult {
        match page.frame_html(&self.frame_name).await {
            Some(html) => self.extract_html(&html),
            None => ExtractionResult::NotFound,
        }
    }

    pub fn extract_html(&self, html: &str) -> ExtractionResult {
        let (Ok(row_sel), Ok(cell_sel)) = (Selector::parse("tr"), Selector::parse("td")) else {
            return ExtractionResult::NotFound;
        };

        let doc = Html::parse_document(html);
        let Some(container) = find_by_id(&doc, &self.container_id) else {
            return ExtractionResult::NotFound;
        };

        let rows: Vec<ElementRef> = container.select(&row_sel).collect();
        if !rows.iter().any(|row| row.select(&cell_sel).next().is_some()) {
            return ExtractionResult::NotFound;
        }

        let items: ItemList = rows
            .iter()
            .filter_map(|row| {
                let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
                if cells.len() <= MIN_CELLS_EXCLUSIVE {
                    return None;
                }
                item_name(&cells[NAME_CELL].text().collect::<String>())
            })
            .collect();
        ExtractionResult::Found(items)
    }
}

fn find_by_id<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(id))
}
