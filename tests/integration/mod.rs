mod ledger_flow;
