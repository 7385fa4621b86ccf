// src/extractors/sheets.rs

/// Where on a company page the table for a sheet lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLocator {
    /// First data table inside `<section id="...">`, or the first data table
    /// of the document when the section is missing.
    Section(&'static str),
    /// First data table of the document.
    Document,
    /// Ranges tables found by the text of their heading cell. The sheet's
    /// metric names are the headings to look for.
    Heading,
}

/// Static description of one output sheet category.
#[derive(Debug, PartialEq, Eq)]
pub struct SheetDefinition {
    /// Master sheet name, e.g. `Profit_Loss`.
    pub name: &'static str,
    /// Prefix for the per-year tabs, e.g. `Annual` in `Annual_2023`.
    pub label: &'static str,
    pub locator: TableLocator,
    /// Metric names (or table headings for [`TableLocator::Heading`]), in search order.
    pub metrics: &'static [&'static str],
}

pub const COMPANY_INFO_SHEET: &str = "Company_Info";

/// Class of the financial statement tables on a company page.
pub const DATA_TABLE_CLASS: &str = "data-table";

const RESULT_METRICS: &[&str] = &[
    "Sales", "Expenses", "Operating Profit", "OPM %", "Other Income", "Interest",
    "Depreciation", "Profit before tax", "Tax %", "Net Profit", "EPS in Rs",
];

pub static MAIN_METRICS: SheetDefinition = SheetDefinition {
    name: "Main_Metrics",
    label: "Main_Metrics",
    locator: TableLocator::Heading,
    metrics: &[
        "Compounded Sales Growth",
        "Compounded Profit Growth",
        "Stock Price CAGR",
        "Return on Equity",
    ],
};

pub static QUARTERLY_RESULTS: SheetDefinition = SheetDefinition {
    name: "Quarterly_Results",
    label: "Quarterly",
    locator: TableLocator::Document,
    metrics: RESULT_METRICS,
};

pub static PROFIT_LOSS: SheetDefinition = SheetDefinition {
    name: "Profit_Loss",
    label: "Annual",
    locator: TableLocator::Section("profit-loss"),
    metrics: &[
        "Sales", "Expenses", "Operating Profit", "OPM %", "Other Income", "Interest",
        "Depreciation", "Profit before tax", "Tax %", "Net Profit", "EPS in Rs",
        "Dividend Payout %",
    ],
};

pub static BALANCE_SHEET: SheetDefinition = SheetDefinition {
    name: "Balance_Sheet",
    label: "Balance",
    locator: TableLocator::Section("balance-sheet"),
    metrics: &[
        "Equity Capital", "Reserves", "Borrowings", "Other Liabilities", "Total Liabilities",
        "Fixed Assets", "CWIP", "Investments", "Other Assets", "Total Assets",
    ],
};

pub static CASH_FLOW: SheetDefinition = SheetDefinition {
    name: "Cash_Flow",
    label: "Cash_Flow",
    locator: TableLocator::Section("cash-flow"),
    metrics: &[
        "Cash from Operating Activity",
        "Cash from Investing Activity",
        "Cash from Financing Activity",
        "Net Cash Flow",
    ],
};

pub static RATIOS: SheetDefinition = SheetDefinition {
    name: "Ratios",
    label: "Ratios",
    locator: TableLocator::Section("ratios"),
    metrics: &[
        "Debtor Days", "Inventory Days", "Days Payable", "Cash Conversion Cycle",
        "Working Capital Days", "ROCE %",
    ],
};

pub static SHAREHOLDING: SheetDefinition = SheetDefinition {
    name: "Shareholding",
    label: "Shareholding",
    locator: TableLocator::Section("shareholding"),
    metrics: &["Promoters", "FIIs", "DIIs", "Public", "No. of Shareholders"],
};

/// Sheets that are pivoted into per-year tabs, in extraction order.
pub static DETAIL_SHEETS: [&SheetDefinition; 6] = [
    &QUARTERLY_RESULTS,
    &PROFIT_LOSS,
    &BALANCE_SHEET,
    &CASH_FLOW,
    &RATIOS,
    &SHAREHOLDING,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_sheet_names_and_labels_are_unique() {
        for (i, a) in DETAIL_SHEETS.iter().enumerate() {
            for b in DETAIL_SHEETS.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
                assert_ne!(a.label, b.label);
            }
        }
    }

    #[test]
    fn only_quarterly_results_reads_the_first_table() {
        let document_wide: Vec<_> = DETAIL_SHEETS
            .iter()
            .filter(|s| s.locator == TableLocator::Document)
            .map(|s| s.name)
            .collect();
        assert_eq!(document_wide, vec!["Quarterly_Results"]);
    }
}
