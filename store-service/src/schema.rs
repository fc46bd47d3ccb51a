diesel::table! {
    products (id) {
        id -> Int4,
        name -> Varchar,
        price -> Numeric,
        inventory -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Int4,
        customer_name -> Varchar,
        customer_email -> Varchar,
        customer_phone -> Nullable<Varchar>,
        customer_address -> Varchar,
        notes -> Nullable<Text>,
        total -> Numeric,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    order_items (id) {
        id -> Int4,
        order_id -> Int4,
        product_id -> Int4,
        product_name -> Varchar,
        price -> Numeric,
        quantity -> Int4,
    }
}

diesel::table! {
    promo_codes (id) {
        id -> Int4,
        code -> Varchar,
        discount_type -> Varchar,
        discount_value -> Numeric,
        min_order_amount -> Nullable<Numeric>,
        max_discount_amount -> Nullable<Numeric>,
        usage_limit -> Nullable<Int4>,
        per_user_limit -> Nullable<Int4>,
        valid_from -> Timestamptz,
        valid_until -> Timestamptz,
        is_active -> Bool,
        usage_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    promo_code_usages (id) {
        id -> Int4,
        promo_code_id -> Int4,
        order_id -> Int4,
        user_id -> Nullable<Varchar>,
        discount_applied -> Numeric,
        used_at -> Timestamptz,
    }
}

diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(promo_code_usages -> promo_codes (promo_code_id));
diesel::joinable!(promo_code_usages -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    products,
    orders,
    order_items,
    promo_codes,
    promo_code_usages,
);
