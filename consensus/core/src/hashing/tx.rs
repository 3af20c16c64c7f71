use crate::tx::Transaction;
use crate::Hash;
use hive_hashes::{ConsensusWrite, HashWriter};

/// Writes the legacy (non-witness) encoding of a transaction.
pub fn write_transaction<W: ConsensusWrite>(tx: &Transaction, w: &mut W) {
    w.put_i32_le(tx.version);
    w.put_compact_size(tx.inputs.len() as u64);
    for input in &tx.inputs {
        w.put_hash(&input.previous_outpoint.transaction_id);
        w.put_u32_le(input.previous_outpoint.index);
        w.put_var_bytes(input.signature_script.as_bytes());
        w.put_u32_le(input.sequence);
    }
    w.put_compact_size(tx.outputs.len() as u64);
    for output in &tx.outputs {
        w.put_i64_le(output.value);
        w.put_var_bytes(output.script_public_key.as_bytes());
    }
    w.put_u32_le(tx.lock_time);
}

pub fn id(tx: &Transaction) -> Hash {
    let mut writer = HashWriter::new();
    write_transaction(tx, &mut writer);
    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Script;
    use crate::tx::{TransactionInput, TransactionOutpoint, TransactionOutput};
    use hive_hashes::double_sha256;

    #[test]
    fn id_is_sha256d_of_encoding() {
        let tx = Transaction::new(
            2,
            vec![TransactionInput::new(TransactionOutpoint::null(), Script::new(vec![1, 2, 3]), 0xffff_fffe)],
            vec![TransactionOutput::new(5000, Script::new(vec![0x51]))],
            7,
        );
        let mut bytes = Vec::new();
        write_transaction(&tx, &mut bytes);
        assert_eq!(bytes.len(), 4 + 1 + 32 + 4 + 1 + 3 + 4 + 1 + 8 + 1 + 1 + 4);
        assert_eq!(&bytes[..4], &2i32.to_le_bytes());
        assert_eq!(id(&tx), double_sha256(&bytes));
    }
}
