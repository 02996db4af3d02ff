//! Checks the TypeScript declarations the frontend consumes.
//! `cargo test` also writes them to `bindings/` through `#[ts(export)]`.

#[cfg(test)]
mod tests {
    use crate::shared::types::*;
    use ts_rs::TS;

    #[test]
    fn convert_units_request_declaration() {
        let decl = ConvertUnitsRequest::decl();
        assert!(decl.contains("amount: number"));
        assert!(decl.contains("from_unit: string"));
        assert!(decl.contains("category: Category | null"));
    }

    #[test]
    fn history_entry_uses_string_ids() {
        let decl = HistoryEntry::decl();
        assert!(decl.contains("id: string"));
        assert!(decl.contains("created_at: string"));
    }
}
