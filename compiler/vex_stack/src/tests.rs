use super::*;

#[test]
fn nested_depth_counts_back_up() {
    fn nest(depth: u32) -> u32 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
    }

    // Deep enough to blow an 8MB main-thread stack without growth.
    assert_eq!(nest(200_000), 200_000);
}

#[test]
fn passes_results_through() {
    let parsed: Result<u8, String> = ensure_sufficient_stack(|| "7".parse::<u8>().map_err(|e| e.to_string()));
    assert_eq!(parsed, Ok(7));
}
