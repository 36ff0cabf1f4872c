use crate::scene::model::CompositeItem;

/// Draw order for `items`: ascending depth, ties kept in document order.
///
/// `sort_by_key` is a stable merge sort, so equal depths never swap and identical input always
/// produces the same draw sequence.
pub fn order_layers(items: &[CompositeItem]) -> Vec<&CompositeItem> {
    let mut ordered: Vec<&CompositeItem> = items.iter().collect();
    ordered.sort_by_key(|item| item.depth);
    ordered
}

#[cfg(test)]
#[path = "../../tests/unit/render/order.rs"]
mod tests;
