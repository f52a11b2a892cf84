//! Static user-facing strings (Albanian).

pub const NO_RESULTS: &str = "Nuk u gjet asnjë kompani.";
pub const LOAD_FAILED: &str =
    "Gabim në ngarkimin e të dhënave. Ju lutem provoni përsëri më vonë.";
pub const SEARCH_PLACEHOLDER: &str = "Kërko kompani, kategori ose qytet...";
pub const LOADING: &str = "Duke ngarkuar...";
pub const SHOW_SIDEBAR: &str = "Shfaq listën";
pub const HIDE_SIDEBAR: &str = "Fshih listën";
pub const ZOOM_IN: &str = "Zmadho";
pub const ZOOM_OUT: &str = "Zvogëlo";
pub const CLOSE: &str = "Mbyll";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// "N kompani" counter shown in the sidebar header.
pub fn company_count(count: usize) -> String {
    format!("{count} kompani")
}
