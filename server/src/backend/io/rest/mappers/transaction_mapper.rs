use crate::backend::domain::commands::top_up::{AmountEntry, TopUpResult};
use crate::backend::domain::models::transaction::Transaction as DomainTransaction;
use shared::{TopUpAmountInput, TopUpResponse, Transaction as SharedTransaction};

/// Mapper between top-up DTOs and domain transactions.
pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(domain: DomainTransaction) -> SharedTransaction {
        SharedTransaction {
            id: domain.id,
            parent_id: domain.parent_id,
            student_id: domain.student_id,
            amount: domain.amount,
            date: domain.date.to_rfc3339(),
        }
    }

    pub fn to_amount_entry(input: TopUpAmountInput) -> AmountEntry {
        match input {
            TopUpAmountInput::Whole(meals) => AmountEntry::Whole(meals),
            TopUpAmountInput::Decimal(value) => AmountEntry::Decimal(value),
            TopUpAmountInput::Text(text) => AmountEntry::Text(text),
        }
    }

    pub fn to_top_up_dto(result: TopUpResult) -> TopUpResponse {
        let amount = result.transaction.amount;
        TopUpResponse {
            transaction: Self::to_dto(result.transaction),
            new_balance: result.new_balance,
            success_message: format!("Added {} meals", amount),
        }
    }
}
