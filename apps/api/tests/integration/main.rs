mod helpers;
mod test_report;
mod test_smoke_flows;
mod test_upload;
