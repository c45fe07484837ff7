/// One inbound provider notification awaiting an authenticity verdict.
///
/// Stateless: nothing here outlives a single verification call.
#[derive(Debug, Clone, Copy)]
pub struct WebhookVerificationRequest<'a> {
    /// Raw notification body, exactly as received on the wire. Signatures
    /// are computed over these bytes; re-serializing the parsed JSON first
    /// would break verification.
    pub payload: &'a [u8],
    /// Claimed signature (or signature-bearing identifier) from the request
    /// headers. Absent when the provider sent none.
    pub signature: Option<&'a str>,
    /// Shared secret or verification key for this provider.
    pub key: &'a str,
}
