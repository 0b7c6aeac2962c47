/// Pad or trim an array to exactly the specified length.
/// Padding is added to the right, trimming is done from the right.
///
/// # Example
/// ```
/// use hpsep::utils::fix_length;
///
/// assert_eq!(fix_length(&[1.0, 2.0, 3.0], 5, 0.0), vec![1.0, 2.0, 3.0, 0.0, 0.0]);
/// assert_eq!(fix_length(&[1.0, 2.0, 3.0], 2, 0.0), vec![1.0, 2.0]);
/// ```
pub fn fix_length<T: Clone>(data: &[T], length: usize, fill_value: T) -> Vec<T> {
    if data.len() >= length {
        data[..length].to_vec()
    } else {
        let mut result = data.to_vec();
        result.resize(length, fill_value);
        result
    }
}

/// In-place variant of [`fix_length`] for owned buffers.
pub fn fix_length_in_place<T: Clone>(data: &mut Vec<T>, length: usize, fill_value: T) {
    if data.len() >= length {
        data.truncate(length);
    } else {
        data.resize(length, fill_value);
    }
}

/// Compute the number of frames that fit in a signal of given length.
pub fn frame_count(length: usize, frame_length: usize, hop_length: usize) -> usize {
    if frame_length > length || hop_length == 0 {
        return 0;
    }
    1 + (length - frame_length) / hop_length
}
