use vypiska_core::model::{format_money, CURRENCY};
use vypiska_core::BatchOutcome;

pub fn print(outcome: &BatchOutcome) {
    let ledger = &outcome.ledger;

    if let Some((first, last)) = ledger.period() {
        println!("=== Statement {first} - {last} ===\n");
    }

    let amounts: Vec<String> = ledger
        .transactions()
        .iter()
        .map(|tx| format_money(tx.amount()))
        .collect();
    let amount_width = amounts.iter().map(|a| a.len()).max().unwrap_or(8);

    for (tx, amount) in ledger.transactions().iter().zip(&amounts) {
        println!(
            "  {}  {:<6}  {:>width$} {}  {}",
            tx.date(),
            tx.kind().label(),
            amount,
            CURRENCY,
            tx.description(),
            width = amount_width
        );
    }

    let totals = ledger.totals();
    println!();
    println!("  Income:   {} {CURRENCY}", format_money(totals.income));
    println!("  Expense:  {} {CURRENCY}", format_money(totals.expense));
    println!("  Balance:  {} {CURRENCY}", format_money(totals.balance));
    println!("  Transactions: {}", ledger.len());

    if outcome.documents.len() > 1 {
        println!();
        for doc in &outcome.documents {
            let fallback = if doc.stats.used_fallback {
                " (fallback)"
            } else {
                ""
            };
            println!(
                "  {}: {} page(s), {} transaction(s){}",
                doc.name, doc.stats.pages, doc.stats.transactions, fallback
            );
        }
    }
}
