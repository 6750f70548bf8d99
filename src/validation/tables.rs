//! Field tables for the entity forms.

use super::rules::Rule;
use super::schema::Schema;
use crate::services::EntityKind;

const CONTRACT_TYPES: &[&str] = &["CLT", "PJ", "ESTAGIO", "TEMPORARIO"];
const BENEFIT_TYPES: &[&str] = &["BENEFICIO", "DESCONTO"];
const ACCOUNT_TYPES: &[&str] = &["CORRENTE", "POUPANCA", "CAIXA", "INVESTIMENTO"];
const TRANSACTION_TYPES: &[&str] = &["RECEITA", "DESPESA", "TRANSFERENCIA"];
const THIRD_PARTY_TYPES: &[&str] = &["CLIENTE", "FORNECEDOR", "AMBOS"];

/// Form schema of `kind`.
#[must_use]
pub fn schema_for(kind: EntityKind) -> Schema {
    match kind {
        EntityKind::Company => Schema::new()
            .field("razao_social", [Rule::Required, Rule::MaxLength(150)])
            .field("nome_fantasia", [Rule::MaxLength(150)])
            .field("cnpj", [Rule::Required, Rule::Digits(14)])
            .field("email", [Rule::Email]),
        EntityKind::Employee => Schema::new()
            .field("nome", [Rule::Required, Rule::MaxLength(120)])
            .field("cpf", [Rule::Required, Rule::Digits(11)])
            .field("email", [Rule::Email])
            .field("cargo", [Rule::MaxLength(80)])
            .field("data_admissao", [Rule::Required, Rule::Date]),
        EntityKind::Contract => Schema::new()
            .field("funcionario_id", [Rule::Required])
            .field("tipo", [Rule::Required, Rule::OneOf(CONTRACT_TYPES)])
            .field("salario", [Rule::Required, Rule::Positive])
            .field("data_inicio", [Rule::Required, Rule::Date])
            .field("data_fim", [Rule::Date]),
        EntityKind::Benefit => Schema::new()
            .field("nome", [Rule::Required, Rule::MaxLength(100)])
            .field("tipo", [Rule::Required, Rule::OneOf(BENEFIT_TYPES)])
            .field("valor", [Rule::Required, Rule::Positive]),
        EntityKind::Account => Schema::new()
            .field("nome", [Rule::Required, Rule::MaxLength(100)])
            .field("tipo", [Rule::Required, Rule::OneOf(ACCOUNT_TYPES)])
            .field("saldo_inicial", [Rule::Numeric]),
        EntityKind::Transaction => Schema::new()
            .field("conta_id", [Rule::Required])
            .field("tipo", [Rule::Required, Rule::OneOf(TRANSACTION_TYPES)])
            .field("valor", [Rule::Required, Rule::Positive])
            .field("data", [Rule::Required, Rule::Date])
            .field("descricao", [Rule::MaxLength(255)]),
        EntityKind::Loan => Schema::new()
            .field("funcionario_id", [Rule::Required])
            .field("valor", [Rule::Required, Rule::Positive])
            .field("parcelas", [Rule::Required, Rule::Positive])
            .field("data_inicio", [Rule::Required, Rule::Date]),
        EntityKind::ThirdParty => Schema::new()
            .field("nome", [Rule::Required, Rule::MaxLength(150)])
            .field("documento", [Rule::Required])
            .field("tipo", [Rule::OneOf(THIRD_PARTY_TYPES)])
            .field("email", [Rule::Email]),
        EntityKind::CostCenter => Schema::new()
            .field("codigo", [Rule::Required, Rule::MaxLength(20)])
            .field("nome", [Rule::Required, Rule::MaxLength(100)]),
        EntityKind::PurchaseOrder => Schema::new()
            .field("terceiro_id", [Rule::Required])
            .field("data_pedido", [Rule::Required, Rule::Date])
            .field("valor_total", [Rule::Positive]),
        EntityKind::TaskType => Schema::new().field("nome", [Rule::Required, Rule::MaxLength(80)]),
        EntityKind::Role => Schema::new().field("nome", [Rule::Required, Rule::MaxLength(60)]),
        EntityKind::User => Schema::new()
            .field("nome", [Rule::Required, Rule::MaxLength(120)])
            .field("email", [Rule::Required, Rule::Email])
            .field("senha", [Rule::MinLength(8)]),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_entity_has_a_schema() {
        for kind in EntityKind::ALL {
            assert!(!schema_for(kind).fields().is_empty(), "{kind}");
        }
    }

    #[test]
    fn user_form() {
        let schema = schema_for(EntityKind::User);
        let errors = schema
            .validate(&json!({"nome": "", "email": "ana", "senha": "123"}))
            .unwrap_err();
        assert_eq!(errors.get("nome"), Some("obrigatório"));
        assert_eq!(errors.get("email"), Some("inválido"));
        assert_eq!(errors.get("senha"), Some("deve ter pelo menos 8 caracteres"));

        assert!(
            schema
                .validate(&json!({"nome": "Ana", "email": "ana@example.com"}))
                .is_ok()
        );
    }

    #[test]
    fn company_form_accepts_formatted_cnpj() {
        let schema = schema_for(EntityKind::Company);
        assert!(
            schema
                .validate(&json!({"razao_social": "ACME Ltda", "cnpj": "12.345.678/0001-90"}))
                .is_ok()
        );
    }

    #[test]
    fn transaction_form() {
        let errors = schema_for(EntityKind::Transaction)
            .validate(&json!({"conta_id": 1, "tipo": "SAQUE", "valor": "-5", "data": "2024-13-01"}))
            .unwrap_err();
        assert_eq!(errors.get("tipo"), Some("valor não permitido"));
        assert_eq!(errors.get("valor"), Some("deve ser maior que zero"));
        assert_eq!(errors.get("data"), Some("data inválida"));
        assert!(errors.get("conta_id").is_none());
    }
}
