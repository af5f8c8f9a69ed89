//! # 쇼핑 리스트 문서 생성
//!
//! 집계된 재료 목록을 텍스트 줄로 만든 뒤 A4 PDF 페이지에 나눠 그립니다.
//! 줄 만들기(`render_lines`)와 PDF 그리기(`render_pdf`)를 분리해서
//! 내용은 PDF 파싱 없이 테스트할 수 있습니다.

use crate::error::AppError;
use crate::models::ShoppingListItem;
use printpdf::{Mm, PdfDocument};

pub const TITLE: &str = "Shopping list:";
pub const EMPTY_MESSAGE: &str = "Shopping list is empty";
/// 다운로드 응답의 `Content-Disposition` 값
pub const CONTENT_DISPOSITION: &str = "attachment; filename=\"shopping_list.pdf\"";

const DIVIDER_LENGTH: usize = 40;

/// 재료 이름이 라틴 문자로 한정되지 않으므로 유니코드 TTF를 문서에 포함합니다.
const FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

// A4, 1인치 여백
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 25.4;
const FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 7.0;

/// 한 페이지에 들어가는 줄 수
pub const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT) as usize;

/// `1. Salt (g) — 15` 형식의 줄 목록을 만듭니다. 비어 있으면 안내 문구 한 줄만 둡니다.
pub fn render_lines(items: &[ShoppingListItem]) -> Vec<String> {
    let mut lines = vec![TITLE.to_string(), "-".repeat(DIVIDER_LENGTH)];

    if items.is_empty() {
        lines.push(EMPTY_MESSAGE.to_string());
        return lines;
    }

    lines.extend(items.iter().enumerate().map(|(i, item)| {
        format!(
            "{}. {} ({}) — {}",
            i + 1,
            item.name,
            item.measurement_unit,
            item.total_amount
        )
    }));
    lines
}

/// 줄 목록을 PDF로 그립니다. 한 페이지를 넘으면 새 페이지를 추가합니다.
pub fn render_pdf(lines: &[String]) -> Result<Vec<u8>, AppError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Shopping list", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_external_font(FONT)
        .map_err(|e| AppError::Internal(format!("PDF font error: {}", e)))?;

    for (index, chunk) in lines.chunks(LINES_PER_PAGE).enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page).get_layer(layer);

        for (row, line) in chunk.iter().enumerate() {
            // PDF 좌표는 아래에서 위로 올라갑니다.
            let y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT * row as f32;
            layer.use_text(line.as_str(), FONT_SIZE, Mm(MARGIN), Mm(y), &font);
        }
    }

    tracing::debug!(lines = lines.len(), pages = page_count(lines.len()), "Rendered shopping list");

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(format!("PDF render error: {}", e)))
}

/// 페이지 수 (빈 목록이라도 제목이 있으므로 최소 1)
pub fn page_count(line_count: usize) -> usize {
    line_count.div_ceil(LINES_PER_PAGE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use printpdf::lopdf::{content::Content, Document};

    fn item(name: &str, unit: &str, total: i64) -> ShoppingListItem {
        ShoppingListItem {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total_amount: total,
        }
    }

    #[test]
    fn lines_are_numbered_under_a_title() {
        let lines = render_lines(&[item("Egg", "pcs", 2), item("Salt", "g", 15)]);
        assert_eq!(lines[0], TITLE);
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], "1. Egg (pcs) — 2");
        assert_eq!(lines[3], "2. Salt (g) — 15");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn empty_list_has_its_own_message() {
        let lines = render_lines(&[]);
        assert_eq!(lines.last().map(String::as_str), Some(EMPTY_MESSAGE));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn long_lists_span_several_pages() {
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(LINES_PER_PAGE), 1);
        assert_eq!(page_count(LINES_PER_PAGE + 1), 2);
    }

    /// 페이지의 `Tj` 연산마다 그려진 글리프 ID 목록
    fn drawn_glyphs(pdf: &[u8], page: u32) -> Vec<Vec<u16>> {
        let doc = Document::load_mem(pdf).unwrap();
        let page_id = doc.get_pages()[&page];
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .map(|op| {
                op.operands[0]
                    .as_str()
                    .unwrap()
                    .chunks(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect()
            })
            .collect()
    }

    fn glyphs_of(text: &str) -> Vec<u16> {
        let face = ttf_parser::Face::parse(FONT, 0).unwrap();
        text.chars()
            .map(|c| face.glyph_index(c).unwrap_or_else(|| panic!("no glyph for {c:?}")).0)
            .collect()
    }

    #[test]
    fn cyrillic_names_are_drawn_in_full() {
        let lines = render_lines(&[item("Соль", "г", 15), item("Яйцо", "шт", 2)]);
        assert_eq!(lines[2], "1. Соль (г) — 15");

        let bytes = render_pdf(&lines).unwrap();
        let drawn = drawn_glyphs(&bytes, 1);
        assert_eq!(drawn.len(), lines.len());
        for (line, glyphs) in lines.iter().zip(&drawn) {
            assert_eq!(glyphs, &glyphs_of(line), "line {line:?}");
        }
    }

    #[test]
    fn pdf_output_has_pdf_header() {
        let items: Vec<_> = (0..100).map(|i| item(&format!("Item {i}"), "g", i)).collect();
        let bytes = render_pdf(&render_lines(&items)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let bytes = render_pdf(&render_lines(&[])).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
