// sentinela-core/src/domain/mappings.rs
//
// Built-in Brazilian federal-unit reference tables, used by the coherence
// check when the manifest ships no mapping files. Loaded once at first use,
// immutable afterwards.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::domain::manifest::MappingTable;

/// FU abbreviation -> accepted federal-unit names. Some units list known
/// spelling variants that appear in the source exports.
static FU_TO_STATE: LazyLock<MappingTable> = LazyLock::new(|| {
    let entries: [(&str, &[&str]); 27] = [
        ("AC", &["Acre"]),
        ("AL", &["Alagoas"]),
        ("AM", &["Amazonas"]),
        ("AP", &["Amapá"]),
        ("BA", &["Bahia"]),
        ("CE", &["Ceará"]),
        ("DF", &["Distrito Federal"]),
        ("ES", &["Espírito Santo", "Espiríto Santo"]),
        ("GO", &["Goiás"]),
        ("MA", &["Maranhão"]),
        ("MG", &["Minas Gerais"]),
        ("MS", &["Mato Grosso do Sul"]),
        ("MT", &["Mato Grosso"]),
        ("PA", &["Pará"]),
        ("PB", &["Paraíba"]),
        ("PE", &["Pernambuco"]),
        ("PI", &["Piauí"]),
        ("PR", &["Paraná"]),
        ("RJ", &["Rio de Janeiro"]),
        ("RN", &["Rio Grande do Norte", "Rio grande do Norte"]),
        ("RO", &["Rondônia"]),
        ("RR", &["Roraima"]),
        ("RS", &["Rio Grande do Sul"]),
        ("SC", &["Santa Catarina"]),
        ("SE", &["Sergipe"]),
        ("SP", &["São Paulo"]),
        ("TO", &["Tocantins"]),
    ];
    entries
        .into_iter()
        .map(|(fu, states)| {
            (
                fu.to_string(),
                states.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
});

/// FU abbreviation -> accepted macro-region name.
static FU_TO_REGION: LazyLock<MappingTable> = LazyLock::new(|| {
    let regions: [(&str, &[&str]); 5] = [
        ("North", &["AC", "AM", "AP", "PA", "RO", "RR", "TO"]),
        (
            "Northeast",
            &["AL", "BA", "CE", "MA", "PB", "PE", "PI", "RN", "SE"],
        ),
        ("Midwest", &["DF", "GO", "MS", "MT"]),
        ("Southeast", &["ES", "MG", "RJ", "SP"]),
        ("South", &["PR", "RS", "SC"]),
    ];
    let mut table = BTreeMap::new();
    for (region, fus) in regions {
        for fu in fus {
            table.insert(fu.to_string(), vec![region.to_string()]);
        }
    }
    table
});

/// Built-in mapping table by name, already normalized as
/// field_a value -> accepted field_b values.
pub fn builtin(name: &str) -> Option<&'static MappingTable> {
    match name {
        "fu_to_state" => Some(&FU_TO_STATE),
        "fu_to_region" => Some(&FU_TO_REGION),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_27_federal_units_present() {
        assert_eq!(FU_TO_STATE.len(), 27);
        assert_eq!(FU_TO_REGION.len(), 27);
    }

    #[test]
    fn test_region_table_is_inverted_per_fu() {
        assert_eq!(FU_TO_REGION["SP"], vec!["Southeast"]);
        assert_eq!(FU_TO_REGION["AC"], vec!["North"]);
        assert_eq!(FU_TO_REGION["DF"], vec!["Midwest"]);
    }

    #[test]
    fn test_spelling_variants_accepted() {
        assert!(FU_TO_STATE["ES"].contains(&"Espiríto Santo".to_string()));
        assert!(FU_TO_STATE["RN"].contains(&"Rio grande do Norte".to_string()));
    }
}
