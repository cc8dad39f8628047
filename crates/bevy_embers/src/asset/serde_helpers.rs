pub(crate) fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

pub(crate) fn is_zero_u8(value: &u8) -> bool {
    *value == 0
}

pub(crate) fn is_zero_i8(value: &i8) -> bool {
    *value == 0
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
