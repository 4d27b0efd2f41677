//! Geometry sampler: pure reads from the document.
//!
//! Safe to call at any frequency.  Elements that have left the document are
//! skipped for the current tick instead of failing the pass.

use crate::core::geometry::{ElementGeometry, ElementHandle, ScrollDirection, ScrollSample};
use crate::core::nav::NavSection;
use crate::page::dom::Document;

pub fn sample_scroll<D: Document + ?Sized>(doc: &D, direction: ScrollDirection) -> ScrollSample {
    ScrollSample {
        scroll_y: doc.scroll_y(),
        direction,
        viewport_height: doc.viewport_height(),
        viewport_width: doc.viewport_width(),
        document_height: doc.document_height(),
    }
}

/// Geometry for each live handle, paired with its position in `handles`.
/// The index survives skipped elements so stagger delays stay tied to
/// query order.
pub fn sample_elements<D: Document + ?Sized>(
    doc: &D,
    handles: &[ElementHandle],
) -> Vec<(usize, ElementGeometry)> {
    handles
        .iter()
        .enumerate()
        .filter_map(|(index, &handle)| match doc.bounding_rect(handle) {
            Some(rect) => Some((index, ElementGeometry { handle, rect })),
            None => {
                tracing::trace!(%handle, "element detached, skipping this tick");
                None
            }
        })
        .collect()
}

pub fn sample_one<D: Document + ?Sized>(doc: &D, handle: ElementHandle) -> Option<ElementGeometry> {
    doc.bounding_rect(handle)
        .map(|rect| ElementGeometry { handle, rect })
}

/// Page-relative extents of every section carrying an `id`.
pub fn sample_sections<D: Document + ?Sized>(doc: &D, selector: &str) -> Vec<NavSection> {
    doc.query_all(selector)
        .into_iter()
        .filter_map(|h| {
            let id = doc.attribute(h, "id")?;
            let (top, height) = doc.offset_box(h)?;
            Some(NavSection { id, top, height })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::sim::SimDocument;

    #[test]
    fn detached_elements_are_skipped_but_indices_kept() {
        let mut doc = SimDocument::demo().unwrap();
        let cards = doc.query_all(".skill-card");
        assert_eq!(cards.len(), 3);
        doc.remove(cards[1]);
        let sampled = sample_elements(&doc, &cards);
        let indices: Vec<usize> = sampled.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn sections_come_from_offset_boxes() {
        let doc = SimDocument::demo().unwrap();
        let sections = sample_sections(&doc, "section[id]");
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["hero", "about", "skills", "projects", "contact"]);
        assert_eq!(sections[1].top, 800.0);
    }
}
