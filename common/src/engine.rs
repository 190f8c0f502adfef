use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::Builder;
use tracing::debug;

use crate::app::{KeyValue, MapReduceApp};

/* =========================
   Particionado
   ========================= */

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// FNV-1a de 32 bits sobre los bytes UTF-8 de la clave, enmascarado a no negativo.
///
/// Tiene que dar lo mismo en cualquier worker y en cualquier intento: dos
/// intentos del mismo map y el reduce que los lee deben coincidir en el bucket.
pub fn ihash(key: &str) -> u32 {
    let mut h = FNV32_OFFSET_BASIS;
    for b in key.as_bytes() {
        h ^= u32::from(*b);
        h = h.wrapping_mul(FNV32_PRIME);
    }
    h & 0x7fff_ffff
}

/// Bucket de reduce para una clave: `ihash(key) mod n_reduce`.
pub fn partition_for(key: &str, n_reduce: usize) -> usize {
    (ihash(key) as usize) % n_reduce.max(1)
}

/* =========================
   Nombres de archivos
   ========================= */

/// Archivo intermedio de la tarea map `map_index` para el bucket `reduce_index`.
pub fn intermediate_name(map_index: usize, reduce_index: usize) -> String {
    format!("inter_{}_{}.json", map_index, reduce_index)
}

/// Salida final del bucket `reduce_index`.
pub fn output_name(reduce_index: usize) -> String {
    format!("mr-out-{}", reduce_index)
}

fn intermediate_temp_prefix(map_index: usize, reduce_index: usize, epoch: u64) -> String {
    format!("temp_inter_{}_{}_{}.", map_index, reduce_index, epoch)
}

fn output_temp_prefix(reduce_index: usize, epoch: u64) -> String {
    format!("temp-mr-out-{}_{}.", reduce_index, epoch)
}

/* =========================
   Commit atómico
   ========================= */

/// Escribe en un temporal único dentro de `dir` y lo renombra a `final_name`.
///
/// El rename es el punto de commit: quien lea ve el archivo completo o no ve
/// nada. Si algo falla antes, el temporal se borra al soltarse.
fn commit_atomically<F>(
    dir: &Path,
    temp_prefix: &str,
    final_name: &str,
    write: F,
) -> io::Result<PathBuf>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let mut tmp = Builder::new().prefix(temp_prefix).tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    let final_path = dir.join(final_name);
    tmp.persist(&final_path).map_err(|e| e.error)?;
    debug!("commit {}", final_path.display());
    Ok(final_path)
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/* =========================
   Lectura de intermedios
   ========================= */

/// Lee un archivo intermedio (un `KeyValue` JSON por línea).
pub fn read_intermediate(path: &Path) -> io::Result<Vec<KeyValue>> {
    let reader = BufReader::new(File::open(path)?);

    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let kv: KeyValue = serde_json::from_str(&line).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("registro inválido en {}: {e}", path.display()),
            )
        })?;
        out.push(kv);
    }

    Ok(out)
}

/// Ordena por clave (estable) y agrupa las corridas de claves iguales.
fn group_by_key(mut kvs: Vec<KeyValue>) -> Vec<(String, Vec<String>)> {
    kvs.sort_by(|a, b| a.key.cmp(&b.key));

    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for kv in kvs {
        match groups.last_mut() {
            Some((key, values)) if *key == kv.key => values.push(kv.value),
            _ => groups.push((kv.key, vec![kv.value])),
        }
    }
    groups
}

/* =========================
   Ejecución de tareas
   ========================= */

/// Ejecuta un intento de la tarea map `map_index`:
///
/// 1. Lee el split completo.
/// 2. Aplica `app.map`.
/// 3. Reparte los pares en `n_reduce` buckets con `partition_for`.
/// 4. Escribe cada bucket (aunque esté vacío) con commit atómico.
///
/// Devuelve las rutas finales, indexadas por bucket. Ante cualquier error se
/// aborta: no hay reporte parcial.
pub fn execute_map(
    app: &dyn MapReduceApp,
    split: &str,
    map_index: usize,
    n_reduce: usize,
    epoch: u64,
    work_dir: &Path,
) -> io::Result<Vec<PathBuf>> {
    let n_reduce = n_reduce.max(1);
    let content = fs::read_to_string(split)?;

    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce];
    for kv in app.map(split, &content) {
        let bucket = partition_for(&kv.key, n_reduce);
        buckets[bucket].push(kv);
    }

    ensure_dir(work_dir)?;

    let mut committed = Vec::with_capacity(n_reduce);
    for (reduce_index, kvs) in buckets.iter().enumerate() {
        let path = commit_atomically(
            work_dir,
            &intermediate_temp_prefix(map_index, reduce_index, epoch),
            &intermediate_name(map_index, reduce_index),
            |w| {
                for kv in kvs {
                    serde_json::to_writer(&mut *w, kv)?;
                    w.write_all(b"\n")?;
                }
                Ok(())
            },
        )?;
        committed.push(path);
    }

    Ok(committed)
}

/// Ejecuta un intento de la tarea reduce `reduce_index`: junta los
/// intermedios `inter_<m>_<reduce_index>` de las `n_map` tareas map, ordena por
/// clave, aplica `app.reduce` a cada grupo y escribe `<clave> <valor>` por línea.
pub fn execute_reduce(
    app: &dyn MapReduceApp,
    reduce_index: usize,
    n_map: usize,
    epoch: u64,
    work_dir: &Path,
) -> io::Result<PathBuf> {
    let mut kvs = Vec::new();
    for map_index in 0..n_map {
        let path = work_dir.join(intermediate_name(map_index, reduce_index));
        kvs.extend(read_intermediate(&path)?);
    }

    let groups = group_by_key(kvs);

    ensure_dir(work_dir)?;

    commit_atomically(
        work_dir,
        &output_temp_prefix(reduce_index, epoch),
        &output_name(reduce_index),
        |w| {
            for (key, values) in &groups {
                let reduced = app.reduce(key, values);
                writeln!(w, "{} {}", key, reduced)?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::Indexer;
    use crate::wordcount::WordCount;
    use std::collections::HashMap;

    fn write_split(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    fn leftover_temps(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter_map(|e| e.file_name().to_str().map(|s| s.to_string()))
            .filter(|n| n.starts_with("temp"))
            .collect()
    }

    /* ============
       PARTICIONADO
       ============ */

    #[test]
    fn ihash_coincide_con_fnv1a_32_enmascarado() {
        assert_eq!(ihash(""), 0x811c_9dc5 & 0x7fff_ffff);
        assert_eq!(ihash("a"), 0xe40c_292c & 0x7fff_ffff);
        assert_eq!(ihash("foobar"), 0xbf9c_f968 & 0x7fff_ffff);
    }

    #[test]
    fn partition_for_es_determinista_y_en_rango() {
        for key in ["", "a", "hola", "mundo_prueba", "ñandú"] {
            for n in 1..8 {
                let p = partition_for(key, n);
                assert!(p < n);
                assert_eq!(p, partition_for(key, n));
            }
        }
        assert_eq!(partition_for("cualquiera", 1), 0);
    }

    #[test]
    fn nombres_de_archivo_siguen_la_convencion() {
        assert_eq!(intermediate_name(3, 7), "inter_3_7.json");
        assert_eq!(output_name(4), "mr-out-4");
    }

    /* ============
       MAP
       ============ */

    #[test]
    fn execute_map_reparte_exactamente_la_salida_del_map() {
        let dir = tempfile::tempdir().unwrap();
        let content = "el perro y el gato y el raton";
        let split = write_split(dir.path(), "in.txt", content);

        let paths = execute_map(&WordCount, &split, 0, 3, 1, dir.path()).unwrap();
        assert_eq!(paths.len(), 3);

        // multiconjunto de todo lo escrito == salida del map
        let mut written: HashMap<KeyValue, usize> = HashMap::new();
        for (bucket, path) in paths.iter().enumerate() {
            for kv in read_intermediate(path).unwrap() {
                assert_eq!(partition_for(&kv.key, 3), bucket);
                *written.entry(kv).or_insert(0) += 1;
            }
        }

        let mut expected: HashMap<KeyValue, usize> = HashMap::new();
        for kv in WordCount.map(&split, content) {
            *expected.entry(kv).or_insert(0) += 1;
        }

        assert_eq!(written, expected);
        assert!(leftover_temps(dir.path()).is_empty());
    }

    #[test]
    fn execute_map_escribe_todos_los_buckets_aunque_esten_vacios() {
        let dir = tempfile::tempdir().unwrap();
        let split = write_split(dir.path(), "one.txt", "solo");

        execute_map(&WordCount, &split, 2, 4, 1, dir.path()).unwrap();

        for r in 0..4 {
            assert!(dir.path().join(intermediate_name(2, r)).exists());
        }
    }

    #[test]
    fn execute_map_con_split_inexistente_falla_sin_dejar_archivos() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_existe.txt");

        let res = execute_map(&WordCount, missing.to_str().unwrap(), 0, 2, 1, dir.path());

        assert!(res.is_err());
        assert!(!dir.path().join(intermediate_name(0, 0)).exists());
        assert!(!dir.path().join(intermediate_name(0, 1)).exists());
    }

    #[test]
    fn execute_map_reintento_sobrescribe_el_intermedio() {
        let dir = tempfile::tempdir().unwrap();
        let split = write_split(dir.path(), "in.txt", "x y z");
        let target = dir.path().join(intermediate_name(0, 0));
        fs::write(&target, "basura de un intento anterior\n").unwrap();

        execute_map(&WordCount, &split, 0, 1, 2, dir.path()).unwrap();

        let kvs = read_intermediate(&target).unwrap();
        assert_eq!(kvs.len(), 3);
    }

    /* ============
       REDUCE
       ============ */

    #[test]
    fn wordcount_dos_splits_dos_particiones() {
        let dir = tempfile::tempdir().unwrap();
        let s0 = write_split(dir.path(), "s0.txt", "a b a");
        let s1 = write_split(dir.path(), "s1.txt", "b c");

        execute_map(&WordCount, &s0, 0, 2, 1, dir.path()).unwrap();
        execute_map(&WordCount, &s1, 1, 2, 1, dir.path()).unwrap();
        execute_reduce(&WordCount, 0, 2, 1, dir.path()).unwrap();
        execute_reduce(&WordCount, 1, 2, 1, dir.path()).unwrap();

        let mut seen: HashMap<String, (String, usize)> = HashMap::new();
        for r in 0..2 {
            let out = fs::read_to_string(dir.path().join(output_name(r))).unwrap();
            for line in out.lines() {
                let (word, count) = line.split_once(' ').unwrap();
                assert_eq!(partition_for(word, 2), r, "palabra {word} en bucket equivocado");
                let prev = seen.insert(word.to_string(), (count.to_string(), r));
                assert!(prev.is_none(), "palabra {word} repetida");
            }
        }

        assert_eq!(seen.len(), 3);
        assert_eq!(seen["a"].0, "2");
        assert_eq!(seen["b"].0, "2");
        assert_eq!(seen["c"].0, "1");
        assert!(leftover_temps(dir.path()).is_empty());
    }

    #[test]
    fn execute_reduce_sale_ordenado_por_clave() {
        let dir = tempfile::tempdir().unwrap();
        let split = write_split(dir.path(), "in.txt", "zeta alfa mu alfa");

        execute_map(&WordCount, &split, 0, 1, 1, dir.path()).unwrap();
        let out_path = execute_reduce(&WordCount, 0, 1, 1, dir.path()).unwrap();

        let out = fs::read_to_string(out_path).unwrap();
        assert_eq!(out, "alfa 2\nmu 1\nzeta 1\n");
    }

    #[test]
    fn execute_reduce_sin_intermedio_falla_sin_salida() {
        let dir = tempfile::tempdir().unwrap();
        let split = write_split(dir.path(), "in.txt", "a b");
        execute_map(&WordCount, &split, 0, 1, 1, dir.path()).unwrap();

        // n_map = 2 pero el map 1 nunca se ejecutó
        let res = execute_reduce(&WordCount, 0, 2, 1, dir.path());

        assert!(res.is_err());
        assert!(!dir.path().join(output_name(0)).exists());
        assert!(leftover_temps(dir.path()).is_empty());
    }

    #[test]
    fn execute_reduce_rechaza_intermedio_corrupto() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(intermediate_name(0, 0)), "{no es json\n").unwrap();

        let err = execute_reduce(&WordCount, 0, 1, 1, dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn execute_reduce_sin_tareas_map_crea_salida_vacia() {
        let dir = tempfile::tempdir().unwrap();

        let out_path = execute_reduce(&WordCount, 0, 0, 1, dir.path()).unwrap();

        assert!(fs::read_to_string(out_path).unwrap().is_empty());
    }

    #[test]
    fn indexer_end_to_end_lista_splits_por_palabra() {
        let dir = tempfile::tempdir().unwrap();
        let s0 = write_split(dir.path(), "a.txt", "gato perro");
        let s1 = write_split(dir.path(), "b.txt", "gato");

        execute_map(&Indexer, &s0, 0, 1, 1, dir.path()).unwrap();
        execute_map(&Indexer, &s1, 1, 1, 1, dir.path()).unwrap();
        let out_path = execute_reduce(&Indexer, 0, 2, 1, dir.path()).unwrap();

        let out = fs::read_to_string(out_path).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("gato 2 {},{}", s0, s1));
        assert_eq!(lines[1], format!("perro 1 {}", s0));
    }

    #[test]
    fn group_by_key_respeta_orden_de_valores() {
        let kvs = vec![
            KeyValue::new("b", "1"),
            KeyValue::new("a", "x"),
            KeyValue::new("b", "2"),
            KeyValue::new("a", "y"),
        ];

        let groups = group_by_key(kvs);

        assert_eq!(
            groups,
            vec![
                ("a".to_string(), vec!["x".to_string(), "y".to_string()]),
                ("b".to_string(), vec!["1".to_string(), "2".to_string()]),
            ]
        );
    }
}
