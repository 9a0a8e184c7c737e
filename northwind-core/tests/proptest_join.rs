use northwind_core::{attach_order_details, group_product_rows, OrderDetail, Product};
use proptest::prelude::*;
use std::collections::HashSet;

// Products with unique ids, plus details that may reference ids outside the set
fn arb_dataset() -> impl Strategy<Value = (Vec<Product>, Vec<OrderDetail>)> {
    (
        prop::collection::hash_set(1i32..50, 0..12),
        prop::collection::vec((1i32..60, 10_000i32..11_000, 1i16..100), 0..80),
    )
        .prop_map(|(ids, raw_details)| {
            let mut ids: Vec<i32> = ids.into_iter().collect();
            ids.sort_unstable();
            let products = ids
                .iter()
                .map(|&id| Product::new(id, format!("product {}", id)))
                .collect();

            // (product_id, order_id) is unique in the table
            let mut seen = HashSet::new();
            let mut details: Vec<OrderDetail> = raw_details
                .into_iter()
                .filter(|(p, o, _)| seen.insert((*p, *o)))
                .map(|(product_id, order_id, quantity)| OrderDetail {
                    order_id,
                    product_id,
                    unit_price: 9.5,
                    quantity,
                    discount: 0.0,
                })
                .collect();
            details.sort_by_key(|d| (d.product_id, d.order_id));
            (products, details)
        })
}

// What a LEFT JOIN ordered by (product_id, order_id) would return
fn joined_rows(
    products: &[Product],
    details: &[OrderDetail],
) -> Vec<(Product, Option<OrderDetail>)> {
    let mut rows = Vec::new();
    for product in products {
        let mut matched = details
            .iter()
            .filter(|d| d.product_id == product.product_id)
            .peekable();
        if matched.peek().is_none() {
            rows.push((product.clone(), None));
        }
        for d in matched {
            rows.push((product.clone(), Some(d.clone())));
        }
    }
    rows
}

proptest! {
    /// Property: split-key join and row-group mapping build identical graphs
    #[test]
    fn prop_strategies_agree((products, details) in arb_dataset()) {
        let grouped = group_product_rows(joined_rows(&products, &details));

        let mut split = products.clone();
        attach_order_details(&mut split, details);

        prop_assert_eq!(grouped, split);
    }

    /// Property: every attached detail belongs to its product and none are invented
    #[test]
    fn prop_details_match_parent((products, details) in arb_dataset()) {
        let mut split = products.clone();
        attach_order_details(&mut split, details.clone());

        let ids: HashSet<i32> = products.iter().map(|p| p.product_id).collect();
        let expected = details.iter().filter(|d| ids.contains(&d.product_id)).count();
        let attached: usize = split.iter().map(Product::order_count).sum();
        prop_assert_eq!(attached, expected);

        for product in &split {
            let list = product.order_details.as_ref().expect("join sets every list");
            prop_assert!(list.iter().all(|d| d.product_id == product.product_id));
        }
    }

    /// Property: duplicated parent rows never produce duplicate products
    #[test]
    fn prop_grouping_deduplicates((products, details) in arb_dataset()) {
        let grouped = group_product_rows(joined_rows(&products, &details));

        let unique: HashSet<i32> = grouped.iter().map(|p| p.product_id).collect();
        prop_assert_eq!(unique.len(), grouped.len());
        prop_assert_eq!(grouped.len(), products.len());
    }
}
