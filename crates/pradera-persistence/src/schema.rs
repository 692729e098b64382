// Esquema Diesel común a SQLite y Postgres.
// Tablas: users, books, flows, blocks, flow_blocks
use diesel::{allow_tables_to_appear_in_same_query, joinable};
diesel::table! {
    users (id) {
        id -> BigInt,
        login -> Text,
        email -> Nullable<Text>,
        activated -> Bool,
    }
}
diesel::table! {
    books (id) {
        id -> BigInt,
        name -> Text,
    }
}
diesel::table! {
    flows (id) {
        id -> BigInt,
        name -> Text,
        user_id -> Nullable<BigInt>,
        book_id -> Nullable<BigInt>,
        version -> BigInt,
    }
}
diesel::table! {
    blocks (id) {
        id -> BigInt,
        block_type -> Text,
        content -> Text,
        created_date_ts -> BigInt,
        hash -> Text,
        parent_id -> Nullable<BigInt>,
        user_id -> BigInt,
    }
}
diesel::table! {
    flow_blocks (id) {
        id -> BigInt,
        block_order -> BigInt,
        flow_id -> BigInt,
        block_id -> BigInt,
    }
}
joinable!(flow_blocks -> blocks (block_id));
joinable!(flow_blocks -> flows (flow_id));
allow_tables_to_appear_in_same_query!(users, books, flows, blocks, flow_blocks);
