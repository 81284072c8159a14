use crate::model::{Amount, Category, NewTransaction, Transaction};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// The example transactions a fresh store starts with, all dated `now`.
pub(crate) fn seed_transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    vec![
        NewTransaction::new(
            amount(1550, 2),
            Category::Fines,
            "Biblioteca Central",
            now,
        )
        .description("Multa por retraso - Libro: Don Quijote")
        .into_transaction("1".to_string()),
        NewTransaction::new(
            amount(4500, 2),
            Category::Printing,
            "Facultad de Ingeniería",
            now,
        )
        .description("Impresión de tesis (150 páginas)")
        .into_transaction("2".to_string()),
        NewTransaction::new(
            amount(12000, 2),
            Category::SpaceRental,
            "Campus Norte",
            now,
        )
        .description("Reserva Sala de Conferencias B")
        .into_transaction("3".to_string()),
    ]
}

fn amount(num: i64, scale: u32) -> Amount {
    // Seed values are literals above and always non-negative.
    Amount::try_from(Decimal::new(num, scale)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed() {
        let seed = seed_transactions(Utc::now());
        let ids: Vec<&str> = seed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        let total: Amount = seed.iter().map(|t| t.amount).sum();
        assert_eq!(total.value(), Decimal::new(18050, 2));
    }
}
