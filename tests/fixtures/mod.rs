//! Symbol pages shaped like the loader's responses

/// A loader page with every header marker and the given trade rows
pub fn symbol_page(ins_code: &str, trades: &[(&str, &str)]) -> String {
    let rows: String = trades
        .iter()
        .map(|(date, cost)| {
            format!(
                "<tr>\n  <td>{date}</td><td>1,000</td><td>900</td><td>1,100</td>\
                 <td>2</td><td>48</td>\n  <td><div class=\"ltr\" title=\"{cost}\">{cost}</div></td>\n</tr>\n"
            )
        })
        .collect();

    format!(
        "<html><head><script type=\"text/javascript\">\n\
         var StartDate='14000101',EndDate='14000101',ExpireDate='13991229';\n\
         var StuffCode='15131',LoadType='Base',Title='Base load, daily';\n\
         var Hours='24',EnergySymbol='DAP00PFBEXD000101';\n\
         var StartValidity='20210321',EndValidity='20210321';\n\
         var StartValidityShamsi='1400/01/01',EndValidityShamsi='1400/01/01';\n\
         var InsCode='{ins_code}',OpenSymbol='1';\n\
         </script></head><body>\n\
         <table class=\"table1\">\n\
         <tr><th>Date</th><th>End</th><th>Low</th><th>High</th><th>Count</th><th>Volume</th><th>Value</th></tr>\n\
         {rows}</table></body></html>"
    )
}
