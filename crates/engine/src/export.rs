//! CSV projection of the raw expense list.

use std::io::Write;

use csv::Writer;

use crate::{Currency, Expense, RateTable, ResultEngine, convert};

/// Writes one row per expense, plus the share converted into `base`.
pub fn write_csv<W: Write>(
    writer: W,
    expenses: &[Expense],
    base: Currency,
    rates: &RateTable,
) -> ResultEngine<()> {
    let mut csv = Writer::from_writer(writer);
    let converted_header = format!("My Share ({base})");
    csv.write_record([
        "Date",
        "Description",
        "Category",
        "Total Amount",
        "Currency",
        "Paid By",
        "My Share",
        converted_header.as_str(),
    ])?;

    for expense in expenses {
        let currency = expense.currency_or(base);
        let converted = convert(expense.my_share, currency, base, rates);
        csv.write_record([
            expense.date.format("%Y-%m-%d").to_string(),
            expense.description.clone(),
            expense.category.label().to_string(),
            format!("{:.2}", expense.total_amount),
            currency.to_string(),
            expense.paid_by.label().to_string(),
            format!("{:.2}", expense.my_share),
            format!("{converted:.2}"),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Same as [`write_csv`] into an in-memory buffer.
pub fn to_csv(expenses: &[Expense], base: Currency, rates: &RateTable) -> ResultEngine<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, expenses, base, rates)?;
    Ok(buffer)
}
