//! Catálogo de categorias financeiras
//!
//! Lista fija de categorías de despesa y receita. Los nombres son los que
//! ven los operadores de la flota y los que se guardan en cada registro financiero.

use serde::Serialize;

use super::financial_entry::EntryType;

/// Nombre de la categoría de combustible en el catálogo
pub const FUEL_CATEGORY: &str = "Combustível";

/// Etiqueta antigua de combustible que aún aparece en datos importados
pub const LEGACY_FUEL_CATEGORY: &str = "Abastecimento";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub description: &'static str,
}

const fn expense(id: &'static str, name: &'static str, description: &'static str) -> Category {
    Category { id, name, entry_type: EntryType::Expense, description }
}

const fn revenue(id: &'static str, name: &'static str, description: &'static str) -> Category {
    Category { id, name, entry_type: EntryType::Revenue, description }
}

pub static CATEGORIES: &[Category] = &[
    expense("fuel", FUEL_CATEGORY, "Abastecimento de combustível"),
    expense("maintenance", "Manutenção", "Manutenção preventiva e corretiva"),
    expense("parts", "Peças", "Compra de peças e componentes"),
    expense("tires", "Pneus", "Troca e manutenção de pneus"),
    expense("oil_change", "Troca de Óleo", "Troca de óleo e filtros"),
    expense("toll", "Pedágio", "Taxas de pedágio"),
    expense("parking", "Estacionamento", "Taxas de estacionamento"),
    expense("fines", "Multas", "Multas de trânsito"),
    expense("insurance", "Seguro", "Seguro do veículo"),
    expense("ipva", "IPVA", "Imposto sobre Propriedade de Veículos Automotores"),
    expense("licensing", "Licenciamento", "Licenciamento anual do veículo"),
    expense("driver_salary", "Salário Motorista", "Salário e benefícios do motorista"),
    expense("fuel_card", "Cartão Combustível", "Taxas e serviços do cartão de combustível"),
    expense("cleaning", "Lavagem", "Lavagem e limpeza do veículo"),
    expense("inspection", "Vistoria", "Vistoria técnica e inspeção veicular"),
    expense("repair", "Reparo", "Reparos e consertos"),
    expense("tools", "Ferramentas", "Compra de ferramentas e equipamentos"),
    expense("communication", "Comunicação", "Telefone, rádio e comunicação"),
    expense("food", "Alimentação", "Alimentação do motorista"),
    expense("lodging", "Hospedagem", "Hospedagem do motorista"),
    expense("fuel_tax", "Imposto Combustível", "ICMS e outros impostos sobre combustível"),
    expense("other_expense", "Outros", "Outras despesas não categorizadas"),
    revenue("freight", "Frete", "Receita de frete de cargas"),
    revenue("delivery", "Entrega", "Receita de entrega de mercadorias"),
    revenue("rental", "Aluguel", "Aluguel do veículo para terceiros"),
    revenue("sale", "Venda", "Venda de mercadorias transportadas"),
    revenue("service", "Serviços", "Prestação de serviços de transporte"),
    revenue("bonus", "Bônus", "Bônus por performance ou metas"),
    revenue("refund", "Reembolso", "Reembolso de despesas"),
    revenue("interest", "Juros", "Juros de aplicações financeiras"),
    revenue("commission", "Comissão", "Comissões recebidas"),
    revenue("other_revenue", "Outros", "Outras receitas não categorizadas"),
];

/// Estadísticas del catálogo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub expenses: usize,
    pub revenues: usize,
}

pub fn all_categories() -> &'static [Category] {
    CATEGORIES
}

pub fn categories_by_type(entry_type: EntryType) -> impl Iterator<Item = &'static Category> {
    CATEGORIES.iter().filter(move |c| c.entry_type == entry_type)
}

pub fn category_names_by_type(entry_type: EntryType) -> Vec<&'static str> {
    categories_by_type(entry_type).map(|c| c.name).collect()
}

pub fn find_by_id(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// "Outros" existe en ambos tipos: devuelve la primera coincidencia
pub fn find_by_name(name: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.name == name)
}

pub fn category_exists(name: &str, entry_type: EntryType) -> bool {
    CATEGORIES
        .iter()
        .any(|c| c.name == name && c.entry_type == entry_type)
}

/// Categorías que alimentan el cálculo de consumo
pub fn is_fuel_category(name: &str) -> bool {
    name == FUEL_CATEGORY || name == LEGACY_FUEL_CATEGORY
}

pub fn category_stats() -> CategoryStats {
    let expenses = categories_by_type(EntryType::Expense).count();
    CategoryStats {
        total: CATEGORIES.len(),
        expenses,
        revenues: CATEGORIES.len() - expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_stats() {
        let stats = category_stats();
        assert_eq!(stats.expenses, 22);
        assert_eq!(stats.revenues, 10);
        assert_eq!(stats.total, 32);
    }

    #[test]
    fn test_category_exists_checks_type() {
        assert!(category_exists("Combustível", EntryType::Expense));
        assert!(!category_exists("Combustível", EntryType::Revenue));
        assert!(category_exists("Frete", EntryType::Revenue));
        assert!(category_exists("Outros", EntryType::Revenue));
        assert!(category_exists("Outros", EntryType::Expense));
        assert!(!category_exists("Teste", EntryType::Expense));
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        assert_eq!(find_by_id("toll").map(|c| c.name), Some("Pedágio"));
        assert_eq!(find_by_name("Frete").map(|c| c.id), Some("freight"));
        assert!(find_by_id("unknown").is_none());
    }

    #[test]
    fn test_fuel_category_aliases() {
        assert!(is_fuel_category(FUEL_CATEGORY));
        assert!(is_fuel_category("Abastecimento"));
        assert!(!is_fuel_category("Cartão Combustível"));
    }

    #[test]
    fn test_names_by_type_keep_catalog_order() {
        let names = category_names_by_type(EntryType::Revenue);
        assert_eq!(names.first(), Some(&"Frete"));
        assert_eq!(names.last(), Some(&"Outros"));
    }
}
