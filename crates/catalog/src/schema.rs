// Table definition for the catalog's single dense table.

diesel::table! {
    stations (id) {
        id -> BigInt,
        name -> Text,
        address -> Text,
        city -> Text,
        state -> Text,
        price_milli_dollars -> BigInt,
        canonical_key -> Text,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        geocode_attempts -> Integer,
        geocode_failed -> Bool,
        last_geocoded_at -> Nullable<Timestamp>,
    }
}
