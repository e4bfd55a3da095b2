//! Mapping between engine values and wire types.

use api_types::{
    chamber::{ChamberNew, ChamberView},
    inventory::{self, TransactionNew, TransactionView},
    ledger::{LedgerNew, LedgerView},
    page,
    party::{PartyPayload, PartyView, SnapshotView},
};
use engine::{
    Chamber, ChamberInput, InventoryType, LedgerCmd, LedgerEntry, LedgerInputs, Party, PartyInput,
    PartySnapshot, Transaction, TransactionCmd,
};

pub(crate) fn party_input(payload: &PartyPayload) -> PartyInput {
    let mut input = PartyInput::new(&payload.name, &payload.father);
    if let Some(phone) = &payload.phone {
        input = input.phone(phone);
    }
    if let Some(address) = &payload.address {
        input = input.address(address);
    }
    input
}

fn inventory_type(value: inventory::InventoryType) -> InventoryType {
    match value {
        inventory::InventoryType::Receive => InventoryType::Receive,
        inventory::InventoryType::Delivery => InventoryType::Delivery,
    }
}

pub(crate) fn transaction_cmd(payload: &TransactionNew) -> TransactionCmd {
    let mut cmd = TransactionCmd::new(
        payload.vouchar_no,
        &payload.sr_no,
        &payload.name,
        party_input(&payload.customer),
        payload.date,
    )
    .inventory_type(inventory_type(payload.inventory_type))
    .year(payload.year)
    .quantity(payload.quantity);
    if let Some(agent) = &payload.agent {
        cmd = cmd.agent(party_input(agent));
    }
    cmd
}

pub(crate) fn ledger_cmd(payload: &LedgerNew) -> LedgerCmd {
    LedgerCmd::new(
        &payload.sr_no,
        payload.year,
        LedgerInputs {
            loan_amount: payload.loan_amount,
            loan_rate: payload.loan_rate,
            quantity: payload.quantity,
            rate: payload.rate,
            empty_bag_quantity: payload.empty_bag_quantity,
            empty_bag_rate: payload.empty_bag_rate,
        },
    )
}

pub(crate) fn chamber_input(payload: &ChamberNew) -> ChamberInput {
    ChamberInput::new(&payload.name, payload.capacity)
}

pub(crate) fn party_view(party: Party) -> PartyView {
    PartyView {
        id: party.id,
        name: party.name,
        slug: party.slug,
        father: party.father,
        phone: party.phone,
        address: party.address,
        version: party.version,
        created_at: party.created_at,
    }
}

fn snapshot_view(snapshot: &PartySnapshot) -> SnapshotView {
    SnapshotView {
        id: snapshot.id(),
        name: snapshot.name().to_string(),
        slug: snapshot.slug().to_string(),
        father: snapshot.father().to_string(),
        phone: snapshot.phone().map(ToString::to_string),
        address: snapshot.address().map(ToString::to_string),
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        date: tx.date,
        inventory_type: match tx.inventory_type {
            InventoryType::Receive => inventory::InventoryType::Receive,
            InventoryType::Delivery => inventory::InventoryType::Delivery,
        },
        vouchar_no: tx.vouchar_no,
        sr_no: tx.sr_no,
        name: tx.name,
        year: tx.year,
        quantity: tx.quantity,
        customer: snapshot_view(&tx.customer),
        agent: tx.agent.as_ref().map(snapshot_view),
        version: tx.version,
        created_at: tx.created_at,
    }
}

pub(crate) fn ledger_view(entry: LedgerEntry) -> LedgerView {
    let (inputs, amounts) = (entry.inputs, entry.amounts);
    LedgerView {
        id: entry.id,
        sr_no: entry.sr_no,
        year: entry.year,
        customer: snapshot_view(&entry.customer),
        agent: entry.agent.as_ref().map(snapshot_view),
        loan_amount: inputs.loan_amount,
        loan_rate: inputs.loan_rate,
        loan_profit: amounts.loan_profit,
        loan_payable: amounts.loan_payable,
        quantity: inputs.quantity,
        rate: inputs.rate,
        service_amount: amounts.service_amount,
        empty_bag_quantity: inputs.empty_bag_quantity,
        empty_bag_rate: inputs.empty_bag_rate,
        empty_bag_amount: amounts.empty_bag_amount,
        total_amount: amounts.total_amount,
        version: entry.version,
        created_at: entry.created_at,
    }
}

pub(crate) fn chamber_view(chamber: Chamber) -> ChamberView {
    ChamberView {
        id: chamber.id,
        name: chamber.name,
        slug: chamber.slug,
        capacity: chamber.capacity,
        version: chamber.version,
        created_at: chamber.created_at,
    }
}

pub(crate) fn page<T, U>(page: engine::Page<T>, f: impl FnMut(T) -> U) -> page::Page<U> {
    let has_prev_page = page.has_prev();
    let has_next_page = page.has_next();
    let prev_page = page.prev_page();
    let next_page = page.next_page();
    page::Page {
        docs: page.items.into_iter().map(f).collect(),
        total_docs: page.total_items,
        limit: page.limit,
        page: page.page,
        total_pages: page.total_pages,
        has_prev_page,
        has_next_page,
        prev_page,
        next_page,
    }
}
